//! TCP transport for SOAP exchanges with a single device.
//!
//! Devices sometimes split one XML response across several TCP segments, so
//! a single read is not enough. Every exchange opens its own connection,
//! reads in fixed-size chunks until the response matches a pattern or the
//! read budget runs out, and closes the connection when it returns.

use std::io::{Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::time::Duration;

use regex::{Captures, Regex, RegexBuilder};
use socket2::{Domain, Protocol, Socket, Type};

use crate::error::SoapError;
use crate::message::SoapRequest;

/// Default connect/read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);

/// Default number of reads allowed per exchange.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Default read chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Timeouts and budgets for device exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub max_attempts: usize,
    pub chunk_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Opens a byte stream to a device.
pub trait Connector {
    type Stream: Read + Write;

    fn connect(&self, addr: SocketAddr, timeout: Duration) -> std::io::Result<Self::Stream>;
}

/// Plain TCP connections with address reuse and socket timeouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, addr: SocketAddr, timeout: Duration) -> std::io::Result<TcpStream> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.connect_timeout(&addr.into(), timeout)?;
        socket.set_read_timeout(Some(timeout))?;
        socket.set_write_timeout(Some(timeout))?;
        Ok(socket.into())
    }
}

/// Capture groups of a successful match, owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMatch {
    groups: Vec<Option<String>>,
}

impl ResponseMatch {
    fn from_captures(captures: &Captures<'_>) -> Self {
        Self {
            groups: captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        }
    }

    /// Whole matched text
    pub fn matched(&self) -> &str {
        self.group(0).unwrap_or_default()
    }

    /// Capture group `index` (0 is the whole match)
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// First capture group, or the whole match when the pattern has none
    pub fn value(&self) -> &str {
        self.group(1).unwrap_or_else(|| self.matched())
    }
}

/// Case-insensitive pattern capturing the text of one XML element,
/// e.g. `<FriendlyName>(.*?)</FriendlyName>`.
pub fn element_pattern(tag: &str) -> Regex {
    let tag = regex::escape(tag);
    RegexBuilder::new(&format!("<{tag}>(.*?)</{tag}>"))
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|_| unreachable!("escaped tag always forms a valid pattern"))
}

/// Read from `reader` until the accumulated response matches `pattern`.
///
/// `pattern` is applied as given. Build it with [`element_pattern`] to match
/// element names regardless of case.
///
/// At most `max_attempts` reads of `chunk_size` bytes are issued; no read
/// follows a successful match. A closed connection or an exhausted budget is
/// [`SoapError::NotFound`], a socket error or timeout aborts immediately.
pub fn read_until_match<R: Read>(
    reader: &mut R,
    pattern: &Regex,
    max_attempts: usize,
    chunk_size: usize,
) -> Result<ResponseMatch, SoapError> {
    let mut response = Vec::new();
    let mut chunk = vec![0u8; chunk_size.max(1)];

    for attempt in 1..=max_attempts {
        let read = reader.read(&mut chunk)?;
        tracing::trace!("Read attempt {}/{}: {} bytes", attempt, max_attempts, read);
        if read == 0 {
            return Err(SoapError::NotFound { attempts: attempt });
        }

        response.extend_from_slice(&chunk[..read]);
        let text = String::from_utf8_lossy(&response);
        if let Some(captures) = pattern.captures(&text) {
            return Ok(ResponseMatch::from_captures(&captures));
        }
    }

    Err(SoapError::NotFound {
        attempts: max_attempts,
    })
}

/// Sends SOAP requests to devices, one connection per call.
#[derive(Debug, Clone, Default)]
pub struct Transport<C = TcpConnector> {
    connector: C,
    config: TransportConfig,
}

impl Transport<TcpConnector> {
    pub fn new(config: TransportConfig) -> Self {
        Self::with_connector(TcpConnector, config)
    }
}

impl<C: Connector> Transport<C> {
    pub fn with_connector(connector: C, config: TransportConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Send `message` and read until `pattern` matches or `max_attempts`
    /// reads have been made.
    ///
    /// Case handling is up to `pattern`; [`element_pattern`] ignores case.
    pub fn send_and_await_pattern(
        &self,
        host: IpAddr,
        port: u16,
        message: &[u8],
        pattern: &Regex,
        max_attempts: usize,
    ) -> Result<ResponseMatch, SoapError> {
        let mut stream = self.open(host, port, message)?;
        let result = read_until_match(&mut stream, pattern, max_attempts, self.config.chunk_size);
        if let Err(e) = &result {
            tracing::debug!("No match for /{}/ from {}:{}: {}", pattern, host, port, e);
        }
        result
    }

    /// Send a request and await `pattern` with the configured read budget.
    ///
    /// As with [`Transport::send_and_await_pattern`], `pattern` is used as given.
    pub fn exchange(
        &self,
        host: IpAddr,
        port: u16,
        request: &SoapRequest,
        pattern: &Regex,
    ) -> Result<ResponseMatch, SoapError> {
        if request.is_empty() {
            return Err(SoapError::InvalidRequest("empty request".to_string()));
        }
        self.send_and_await_pattern(host, port, &request.to_bytes(), pattern, self.config.max_attempts)
    }

    /// Send a request, read once and discard the reply.
    ///
    /// Connect and send failures are returned; the reply itself is not checked.
    pub fn send_command(&self, host: IpAddr, port: u16, request: &SoapRequest) -> Result<(), SoapError> {
        if request.is_empty() {
            return Err(SoapError::InvalidRequest("empty request".to_string()));
        }
        let mut stream = self.open(host, port, &request.to_bytes())?;
        let mut chunk = vec![0u8; self.config.chunk_size.max(1)];
        match stream.read(&mut chunk) {
            Ok(read) => tracing::trace!("Discarded {} byte reply from {}:{}", read, host, port),
            Err(e) => tracing::debug!("No reply from {}:{}: {}", host, port, e),
        }
        Ok(())
    }

    fn open(&self, host: IpAddr, port: u16, message: &[u8]) -> Result<C::Stream, SoapError> {
        let addr = SocketAddr::new(host, port);
        tracing::debug!("Connecting to {}", addr);
        let mut stream = self.connector.connect(addr, self.config.timeout)?;
        stream.write_all(message)?;
        stream.flush()?;
        Ok(stream)
    }
}
