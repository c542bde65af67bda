//! WeMo device discovery library
//!
//! Locates Belkin WeMo devices on the local network with an SSDP M-SEARCH
//! filtered by the device type's service string.
//!
//! # Quick Start
//!
//! ```no_run
//! use wemo_discovery::{discover, DeviceKind};
//!
//! for advertisement in discover(DeviceKind::Socket)? {
//!     println!("Socket at {}", advertisement.location);
//! }
//! # Ok::<(), wemo_discovery::DiscoveryError>(())
//! ```
//!
//! # Custom sockets
//!
//! [`Discoverer::with_factory`] accepts any [`SocketFactory`], which is how the
//! search loop is exercised without a network.

mod discovery;
mod error;
pub mod interface;
mod ssdp;

pub use discovery::Discoverer;
pub use error::{DiscoveryError, Result};
pub use interface::active_interface_address;
pub use ssdp::{MulticastSocketFactory, SocketFactory, SsdpSocket, MULTICAST_ADDR, SSDP_PORT};

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

/// Default time to wait for SSDP responses.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);

/// Default receive buffer size for one SSDP datagram.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// The WeMo device families discovery can search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Switchable smart socket ("controllee")
    Socket,
    /// Motion sensor
    Sensor,
    /// WeMo Link bridge
    Link,
}

impl DeviceKind {
    /// Every kind, in the order a full network scan visits them
    pub const ALL: [DeviceKind; 3] = [DeviceKind::Socket, DeviceKind::Sensor, DeviceKind::Link];

    /// SSDP search target (ST) for this kind
    pub fn search_target(&self) -> &'static str {
        match self {
            DeviceKind::Socket => "urn:Belkin:device:controllee:1",
            DeviceKind::Sensor => "urn:Belkin:device:sensor:1",
            DeviceKind::Link => "urn:Belkin:device:bridge:1",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeviceKind::Socket => "socket",
            DeviceKind::Sensor => "sensor",
            DeviceKind::Link => "link",
        }
    }

    /// Classify a service type string as returned in an SSDP `ST` header.
    pub fn from_search_target(st: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.search_target().eq_ignore_ascii_case(st.trim()))
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceKind {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "socket" | "controllee" => Ok(DeviceKind::Socket),
            "sensor" => Ok(DeviceKind::Sensor),
            "link" | "bridge" => Ok(DeviceKind::Link),
            other => Err(DiscoveryError::ParseError(format!("Unknown device kind '{}'", other))),
        }
    }
}

/// One device's answer to an M-SEARCH.
///
/// Two advertisements are the same device when all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceAdvertisement {
    /// Description URL, e.g. "http://192.168.1.50:49153/setup.xml"
    pub location: String,
    /// Unique service name, e.g. "uuid:Socket-1_0-221239K1100ABC::urn:Belkin:device:controllee:1"
    pub usn: Option<String>,
    /// Advertised service type, e.g. "urn:Belkin:device:controllee:1"
    pub service_type: Option<String>,
}

impl DeviceAdvertisement {
    /// Build an advertisement carrying only a location.
    pub fn from_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            usn: None,
            service_type: None,
        }
    }

    /// The kind declared by the advertisement's service type, if recognised.
    pub fn kind(&self) -> Option<DeviceKind> {
        self.service_type.as_deref().and_then(DeviceKind::from_search_target)
    }
}

/// Settings for one discovery window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// How long to wait for the next response before closing the window
    pub timeout: Duration,
    /// Receive buffer size per datagram
    pub chunk_size: usize,
    /// Local address to bind; `None` selects the active interface
    pub interface: Option<Ipv4Addr>,
    /// Gateway used to find the active interface by routing probe
    pub gateway_probe: SocketAddrV4,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            interface: None,
            gateway_probe: interface::DEFAULT_GATEWAY_PROBE,
        }
    }
}

/// Discover devices of `kind` with the default configuration.
pub fn discover(kind: DeviceKind) -> Result<Vec<DeviceAdvertisement>> {
    Discoverer::default().discover(kind)
}

/// Discover devices of `kind`, waiting `timeout` for each response.
pub fn discover_with_timeout(kind: DeviceKind, timeout: Duration) -> Result<Vec<DeviceAdvertisement>> {
    let config = DiscoveryConfig {
        timeout,
        ..DiscoveryConfig::default()
    };
    Discoverer::new(config).discover(kind)
}
