//! Test helpers: an in-memory WeMo network for SSDP and SOAP traffic

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::rc::Rc;
use std::time::Duration;

use wemo_discovery::{DiscoveryError, SocketFactory, SsdpSocket};
use wemo_sdk::{Connector, Discoverer, DiscoveryConfig, Transport, TransportConfig};

pub const SOCKET_ST: &str = "urn:Belkin:device:controllee:1";
pub const SENSOR_ST: &str = "urn:Belkin:device:sensor:1";
pub const BRIDGE_ST: &str = "urn:Belkin:device:bridge:1";

/// How a simulated device answers SOAP requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDevice {
    /// `None` keeps the name query unanswered
    pub name: Option<String>,
    /// Text inside `<BinaryState>`; `None` keeps the state query unanswered
    pub reported_state: Option<String>,
    /// Deliver each reply in two segments, cut inside the payload
    pub split_replies: bool,
}

impl FakeDevice {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            reported_state: Some("0".to_string()),
            split_replies: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            name: None,
            reported_state: None,
            split_replies: false,
        }
    }

    pub fn reporting(mut self, state: &str) -> Self {
        self.reported_state = Some(state.to_string());
        self
    }

    pub fn split(mut self) -> Self {
        self.split_replies = true;
        self
    }
}

/// One SOAP request as the device received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub addr: SocketAddr,
    pub action: String,
    pub text: String,
}

#[derive(Debug, Default)]
struct NetworkState {
    devices: HashMap<SocketAddr, FakeDevice>,
    requests: Vec<Request>,
}

/// Connector routing connections to simulated devices.
///
/// Clones share the same network. Unknown addresses refuse the connection.
#[derive(Debug, Clone, Default)]
pub struct FakeNetwork {
    state: Rc<RefCell<NetworkState>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, addr: &str, device: FakeDevice) -> &Self {
        let addr: SocketAddr = addr.parse().expect("test address");
        self.state.borrow_mut().devices.insert(addr, device);
        self
    }

    pub fn transport(&self) -> Transport<FakeNetwork> {
        Transport::with_connector(self.clone(), TransportConfig::default())
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    /// SOAP action names received, in order
    pub fn actions(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.action).collect()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }

    pub fn reported_state(&self, addr: &str) -> Option<String> {
        let addr: SocketAddr = addr.parse().expect("test address");
        self.state
            .borrow()
            .devices
            .get(&addr)
            .and_then(|device| device.reported_state.clone())
    }

    fn respond(&self, addr: SocketAddr, written: &[u8]) -> VecDeque<Vec<u8>> {
        let text = String::from_utf8_lossy(written).into_owned();
        let action = soap_action(&text);

        let mut state = self.state.borrow_mut();
        state.requests.push(Request {
            addr,
            action: action.clone(),
            text: text.clone(),
        });

        let Some(device) = state.devices.get_mut(&addr) else {
            return VecDeque::new();
        };

        let reply = match action.as_str() {
            "GetFriendlyName" => device
                .name
                .as_ref()
                .map(|name| envelope("GetFriendlyName", "FriendlyName", name)),
            "GetBinaryState" => device
                .reported_state
                .as_ref()
                .map(|value| envelope("GetBinaryState", "BinaryState", value)),
            "SetBinaryState" => {
                let value = element_text(&text, "BinaryState").unwrap_or_default();
                device.reported_state = Some(value.clone());
                Some(envelope("SetBinaryState", "BinaryState", &value))
            }
            _ => None,
        };

        match reply {
            Some((reply, payload_at)) if device.split_replies => {
                let (first, second) = reply.split_at(payload_at);
                VecDeque::from([first.as_bytes().to_vec(), second.as_bytes().to_vec()])
            }
            Some((reply, _)) => VecDeque::from([reply.into_bytes()]),
            None => VecDeque::new(),
        }
    }
}

impl Connector for FakeNetwork {
    type Stream = FakeStream;

    fn connect(&self, addr: SocketAddr, _timeout: Duration) -> io::Result<FakeStream> {
        if !self.state.borrow().devices.contains_key(&addr) {
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused));
        }
        Ok(FakeStream {
            addr,
            network: self.clone(),
            written: Vec::new(),
            replies: None,
        })
    }
}

/// One connection to a simulated device
pub struct FakeStream {
    addr: SocketAddr,
    network: FakeNetwork,
    written: Vec<u8>,
    replies: Option<VecDeque<Vec<u8>>>,
}

impl Write for FakeStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for FakeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.replies.is_none() {
            self.replies = Some(self.network.respond(self.addr, &self.written));
        }
        let Some(replies) = self.replies.as_mut() else {
            return Ok(0);
        };

        match replies.pop_front() {
            Some(mut chunk) => {
                let len = chunk.len().min(buf.len());
                buf[..len].copy_from_slice(&chunk[..len]);
                if len < chunk.len() {
                    replies.push_front(chunk.split_off(len));
                }
                Ok(len)
            }
            None => Ok(0),
        }
    }
}

/// Response envelope and the byte offset halfway through its payload
fn envelope(action: &str, element: &str, value: &str) -> (String, usize) {
    let head = format!(
        "HTTP/1.1 200 OK\r\n\
         CONTENT-TYPE: text/xml; charset=\"utf-8\"\r\n\
         X-User-Agent: redsonic\r\n\r\n\
         <s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\"><s:Body>\n\
         <u:{action}Response xmlns:u=\"urn:Belkin:service:basicevent:1\">\n\
         <{element}>"
    );
    let tail = format!("</{element}>\n</u:{action}Response>\n</s:Body> </s:Envelope>");
    let payload_at = head.len() + value.len() / 2;
    (format!("{head}{value}{tail}"), payload_at)
}

fn soap_action(request: &str) -> String {
    request
        .lines()
        .find(|line| line.to_ascii_lowercase().starts_with("soapaction:"))
        .and_then(|line| line.split_once('#'))
        .map(|(_, rest)| rest.trim().trim_end_matches('"').to_string())
        .unwrap_or_default()
}

fn element_text(text: &str, element: &str) -> Option<String> {
    let open = format!("<{}>", element);
    let close = format!("</{}>", element);
    let start = text.find(&open)? + open.len();
    let end = start + text[start..].find(&close)?;
    Some(text[start..end].to_string())
}

/// SSDP fake answering each search target with its own datagrams
#[derive(Debug, Clone, Default)]
pub struct FakeSsdp {
    replies: Rc<RefCell<HashMap<String, Vec<String>>>>,
}

impl FakeSsdp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, search_target: &str, datagram: String) -> &Self {
        self.replies
            .borrow_mut()
            .entry(search_target.to_string())
            .or_default()
            .push(datagram);
        self
    }

    /// Discoverer bound to loopback so no interface detection runs
    pub fn discoverer(&self) -> Discoverer<FakeSsdp> {
        let config = DiscoveryConfig {
            timeout: Duration::from_millis(50),
            interface: Some(Ipv4Addr::LOCALHOST),
            ..DiscoveryConfig::default()
        };
        Discoverer::with_factory(self.clone(), config)
    }
}

pub struct FakeSsdpSocket {
    replies: Rc<RefCell<HashMap<String, Vec<String>>>>,
    pending: RefCell<VecDeque<String>>,
}

impl SsdpSocket for FakeSsdpSocket {
    fn send_to(&self, buf: &[u8], _target: SocketAddrV4) -> io::Result<usize> {
        let request = String::from_utf8_lossy(buf);
        let search_target = request
            .lines()
            .find_map(|line| line.strip_prefix("ST:"))
            .map(str::trim)
            .unwrap_or_default();
        if let Some(datagrams) = self.replies.borrow().get(search_target) {
            self.pending.borrow_mut().extend(datagrams.iter().cloned());
        }
        Ok(buf.len())
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        match self.pending.borrow_mut().pop_front() {
            Some(datagram) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram.as_bytes()[..len]);
                Ok(len)
            }
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }
}

impl SocketFactory for FakeSsdp {
    type Socket = FakeSsdpSocket;

    fn open(&self, _bind: Ipv4Addr, _timeout: Duration) -> Result<FakeSsdpSocket, DiscoveryError> {
        Ok(FakeSsdpSocket {
            replies: Rc::clone(&self.replies),
            pending: RefCell::new(VecDeque::new()),
        })
    }
}

/// Factory whose socket setup fails
pub struct FailingSsdp;

impl SocketFactory for FailingSsdp {
    type Socket = FakeSsdpSocket;

    fn open(&self, _bind: Ipv4Addr, _timeout: Duration) -> Result<FakeSsdpSocket, DiscoveryError> {
        Err(DiscoveryError::NetworkError("Address already in use".to_string()))
    }
}

/// A WeMo SSDP reply for a device at `addr`
pub fn advertisement(addr: &str, serial: &str, st: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age=86400\r\n\
         EXT:\r\n\
         LOCATION: http://{addr}/setup.xml\r\n\
         SERVER: Unspecified, UPnP/1.0, Unspecified\r\n\
         ST: {st}\r\n\
         USN: uuid:Socket-1_0-{serial}::{st}\r\n\r\n"
    )
}

pub fn location(addr: &str) -> String {
    format!("http://{}/setup.xml", addr)
}
