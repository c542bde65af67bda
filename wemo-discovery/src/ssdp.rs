//! SSDP (Simple Service Discovery Protocol) plumbing for WeMo discovery
//!
//! The multicast socket sits behind the [`SocketFactory`] / [`SsdpSocket`] pair
//! so the search loop can run against an in-memory socket in tests.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::{DiscoveryError, Result};

/// SSDP multicast group.
pub const MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// SSDP port, used both for the group and for the local bind.
pub const SSDP_PORT: u16 = 1900;

/// A datagram socket able to send one search request and receive replies.
pub trait SsdpSocket {
    /// Send `buf` to `target`.
    fn send_to(&self, buf: &[u8], target: SocketAddrV4) -> io::Result<usize>;

    /// Receive one datagram into `buf`, honouring the socket's read timeout.
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

impl SsdpSocket for UdpSocket {
    fn send_to(&self, buf: &[u8], target: SocketAddrV4) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target)
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        UdpSocket::recv(self, buf)
    }
}

/// Opens sockets for a discovery session.
pub trait SocketFactory {
    type Socket: SsdpSocket;

    /// Open a socket bound to `bind` on the SSDP port, member of the SSDP group,
    /// whose receives give up after `timeout`.
    fn open(&self, bind: Ipv4Addr, timeout: Duration) -> Result<Self::Socket>;
}

/// The real multicast socket factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct MulticastSocketFactory;

impl SocketFactory for MulticastSocketFactory {
    type Socket = UdpSocket;

    fn open(&self, bind: Ipv4Addr, timeout: Duration) -> Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create UDP socket: {}", e)))?;

        socket
            .set_reuse_address(true)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set SO_REUSEADDR: {}", e)))?;

        #[cfg(unix)]
        if let Err(e) = socket.set_reuse_port(true) {
            tracing::warn!("Failed to set SO_REUSEPORT on {}: {}", bind, e);
        }

        socket
            .set_multicast_if_v4(&bind)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast interface {}: {}", bind, e)))?;

        let bind_addr = SocketAddr::from(SocketAddrV4::new(bind, SSDP_PORT));
        socket
            .bind(&bind_addr.into())
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind {}: {}", bind_addr, e)))?;

        socket
            .join_multicast_v4(&MULTICAST_ADDR, &Ipv4Addr::UNSPECIFIED)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to join multicast group: {}", e)))?;

        socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

        Ok(socket.into())
    }
}

/// SSDP response fields used for device classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub usn: Option<String>,
    pub st: Option<String>,
}

/// Build the M-SEARCH request for one search target.
pub(crate) fn build_msearch(search_target: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST:{}:{}\r\n\
         ST:{}\r\n\
         MX:2\r\n\
         MAN:\"ssdp:discover\"\r\n\
         \r\n",
        MULTICAST_ADDR, SSDP_PORT, search_target
    )
}

/// SSDP client over one already-open socket
pub(crate) struct SsdpClient<S> {
    socket: S,
    chunk_size: usize,
}

impl<S: SsdpSocket> SsdpClient<S> {
    pub fn new(socket: S, chunk_size: usize) -> Self {
        Self { socket, chunk_size }
    }

    /// Send an M-SEARCH request and return an iterator of responses
    pub fn search(&self, search_target: &str) -> Result<SsdpResponseIterator<'_, S>> {
        let request = build_msearch(search_target);

        self.socket
            .send_to(request.as_bytes(), SocketAddrV4::new(MULTICAST_ADDR, SSDP_PORT))
            .map_err(|e| match e.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => DiscoveryError::Timeout,
                _ => DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {}", e)),
            })?;

        Ok(SsdpResponseIterator::new(&self.socket, self.chunk_size))
    }
}

/// Iterator over SSDP responses, finishing at the first receive timeout
pub(crate) struct SsdpResponseIterator<'a, S> {
    socket: &'a S,
    buffer: Vec<u8>,
    finished: bool,
}

impl<'a, S: SsdpSocket> SsdpResponseIterator<'a, S> {
    fn new(socket: &'a S, chunk_size: usize) -> Self {
        Self {
            socket,
            buffer: vec![0; chunk_size],
            finished: false,
        }
    }
}

impl<'a, S: SsdpSocket> Iterator for SsdpResponseIterator<'a, S> {
    type Item = Result<SsdpResponse>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.socket.recv(&mut self.buffer) {
                Ok(size) => {
                    let Ok(text) = std::str::from_utf8(&self.buffer[..size]) else {
                        tracing::trace!("Dropping non UTF-8 SSDP datagram ({} bytes)", size);
                        continue;
                    };
                    match parse_ssdp_response(text) {
                        Some(response) => return Some(Ok(response)),
                        None => tracing::trace!("Dropping SSDP datagram without LOCATION"),
                    }
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    self.finished = true;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(DiscoveryError::NetworkError(format!("Socket error: {}", e))));
                }
            }
        }
        None
    }
}

/// Parse an SSDP response from HTTP text. A LOCATION header is required.
pub(crate) fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut location = None;
    let mut usn = None;
    let mut st = None;

    for line in response.lines() {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        } else if let Some(value) = extract_header_value(line, "ST:") {
            st = Some(value);
        }
    }

    let location = location.filter(|l| !l.is_empty())?;
    Some(SsdpResponse { location, usn, st })
}

/// Extract header value from a line like "HEADER: value"
fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len() && line.as_bytes()[..header.len()].eq_ignore_ascii_case(header.as_bytes()) {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_msearch() {
        let request = build_msearch("urn:Belkin:device:controllee:1");
        assert_eq!(
            request,
            "M-SEARCH * HTTP/1.1\r\n\
             HOST:239.255.255.250:1900\r\n\
             ST:urn:Belkin:device:controllee:1\r\n\
             MX:2\r\n\
             MAN:\"ssdp:discover\"\r\n\r\n"
        );
    }

    #[test]
    fn test_parse_ssdp_response_full() {
        let response = "HTTP/1.1 200 OK\r\n\
            CACHE-CONTROL: max-age=86400\r\n\
            LOCATION: http://192.168.1.50:49153/setup.xml\r\n\
            SERVER: Unspecified, UPnP/1.0, Unspecified\r\n\
            ST: urn:Belkin:device:controllee:1\r\n\
            USN: uuid:Socket-1_0-221239K1100ABC::urn:Belkin:device:controllee:1\r\n\
            \r\n";

        let parsed = parse_ssdp_response(response).unwrap();

        assert_eq!(parsed.location, "http://192.168.1.50:49153/setup.xml");
        assert_eq!(parsed.st.as_deref(), Some("urn:Belkin:device:controllee:1"));
        assert_eq!(
            parsed.usn.as_deref(),
            Some("uuid:Socket-1_0-221239K1100ABC::urn:Belkin:device:controllee:1")
        );
    }

    #[test]
    fn test_parse_ssdp_response_location_only() {
        let response = "HTTP/1.1 200 OK\r\nlocation: http://10.0.0.7:49154/setup.xml\r\n\r\n";

        let parsed = parse_ssdp_response(response).unwrap();
        assert_eq!(parsed.location, "http://10.0.0.7:49154/setup.xml");
        assert_eq!(parsed.usn, None);
        assert_eq!(parsed.st, None);
    }

    #[test]
    fn test_parse_ssdp_response_missing_location() {
        let response = "HTTP/1.1 200 OK\r\n\
            ST: urn:Belkin:device:controllee:1\r\n\
            USN: uuid:Socket-1_0-221239K1100ABC::urn:Belkin:device:controllee:1\r\n\
            \r\n";

        assert!(parse_ssdp_response(response).is_none());
    }

    #[test]
    fn test_parse_ssdp_response_empty_location() {
        assert!(parse_ssdp_response("HTTP/1.1 200 OK\r\nLOCATION: \r\n\r\n").is_none());
    }

    #[test]
    fn test_parse_ssdp_response_malformed() {
        assert!(parse_ssdp_response("").is_none());
        assert!(parse_ssdp_response("This is not a valid SSDP response\r\nSome random text\r\n").is_none());
    }

    #[test]
    fn test_extract_header_value_case_insensitive() {
        for line in [
            "LOCATION: http://example.com",
            "location: http://example.com",
            "LoCaTiOn:\thttp://example.com   ",
        ] {
            assert_eq!(
                extract_header_value(line, "LOCATION:"),
                Some("http://example.com".to_string())
            );
        }
    }

    #[test]
    fn test_extract_header_value_no_match() {
        assert_eq!(extract_header_value("OTHER: value", "LOCATION:"), None);
        assert_eq!(extract_header_value("LOCATIONS: value", "LOCATION:"), None);
        assert_eq!(extract_header_value("LOCATION:", "LOCATION:"), None);
        // "ST:" must not swallow other headers that merely start with "st"
        assert_eq!(extract_header_value("STATUS: 1", "ST:"), None);
    }
}
