//! Test helpers: scripted SSDP sockets and advertisement fixtures

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::rc::Rc;
use std::time::Duration;

use wemo_discovery::{DiscoveryError, SocketFactory, SsdpSocket};

/// One step of a scripted receive sequence
#[derive(Debug, Clone)]
pub enum Recv {
    Datagram(Vec<u8>),
    Error(io::ErrorKind),
}

/// Everything the fake network observed
#[derive(Debug, Default)]
pub struct Observed {
    pub opened: Cell<usize>,
    pub bound_to: RefCell<Option<Ipv4Addr>>,
    pub sent: RefCell<Vec<(String, SocketAddrV4)>>,
    pub recv_calls: Cell<usize>,
}

/// Socket replaying a fixed script, then timing out
pub struct ScriptedSocket {
    script: RefCell<VecDeque<Recv>>,
    observed: Rc<Observed>,
}

impl SsdpSocket for ScriptedSocket {
    fn send_to(&self, buf: &[u8], target: SocketAddrV4) -> io::Result<usize> {
        self.observed
            .sent
            .borrow_mut()
            .push((String::from_utf8_lossy(buf).into_owned(), target));
        Ok(buf.len())
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.observed.recv_calls.set(self.observed.recv_calls.get() + 1);
        match self.script.borrow_mut().pop_front() {
            Some(Recv::Datagram(data)) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            Some(Recv::Error(kind)) => Err(io::Error::from(kind)),
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }
}

/// Factory handing out one scripted socket
pub struct ScriptedFactory {
    script: RefCell<Option<VecDeque<Recv>>>,
    pub observed: Rc<Observed>,
}

impl ScriptedFactory {
    pub fn new(script: Vec<Recv>) -> Self {
        Self {
            script: RefCell::new(Some(script.into())),
            observed: Rc::new(Observed::default()),
        }
    }

    pub fn replying(datagrams: &[String]) -> Self {
        Self::new(
            datagrams
                .iter()
                .map(|d| Recv::Datagram(d.as_bytes().to_vec()))
                .collect(),
        )
    }
}

impl SocketFactory for ScriptedFactory {
    type Socket = ScriptedSocket;

    fn open(&self, bind: Ipv4Addr, _timeout: Duration) -> Result<ScriptedSocket, DiscoveryError> {
        self.observed.opened.set(self.observed.opened.get() + 1);
        *self.observed.bound_to.borrow_mut() = Some(bind);
        Ok(ScriptedSocket {
            script: RefCell::new(self.script.borrow_mut().take().unwrap_or_default()),
            observed: Rc::clone(&self.observed),
        })
    }
}

/// Factory that fails the test if discovery touches the network
pub struct ForbiddenFactory;

impl SocketFactory for ForbiddenFactory {
    type Socket = ScriptedSocket;

    fn open(&self, _bind: Ipv4Addr, _timeout: Duration) -> Result<ScriptedSocket, DiscoveryError> {
        panic!("discovery must not open a socket here");
    }
}

/// Factory whose socket setup fails
pub struct FailingFactory;

impl SocketFactory for FailingFactory {
    type Socket = ScriptedSocket;

    fn open(&self, bind: Ipv4Addr, _timeout: Duration) -> Result<ScriptedSocket, DiscoveryError> {
        Err(DiscoveryError::NetworkError(format!(
            "Failed to bind {}:1900: Address already in use",
            bind
        )))
    }
}

/// A WeMo SSDP reply as a real socket sends it
pub fn advertisement(ip: &str, port: u16, serial: &str, st: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age=86400\r\n\
         DATE: Sat, 17 Aug 2013 02:20:00 GMT\r\n\
         EXT:\r\n\
         LOCATION: http://{ip}:{port}/setup.xml\r\n\
         OPT: \"http://schemas.upnp.org/upnp/1/0/\"; ns=01\r\n\
         SERVER: Unspecified, UPnP/1.0, Unspecified\r\n\
         X-User-Agent: redsonic\r\n\
         ST: {st}\r\n\
         USN: uuid:Socket-1_0-{serial}::{st}\r\n\r\n"
    )
}

pub fn socket_advertisement(ip: &str, serial: &str) -> String {
    advertisement(ip, 49153, serial, "urn:Belkin:device:controllee:1")
}
