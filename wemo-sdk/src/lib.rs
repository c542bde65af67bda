//! # WeMo SDK - discovery and control of Belkin WeMo devices
//!
//! Finds devices with SSDP, then talks to each one with small SOAP requests
//! over plain TCP:
//!
//! ```rust,no_run
//! use wemo_sdk::{Discoverer, Socket, Transport, TransportConfig};
//!
//! fn main() -> Result<(), wemo_sdk::SdkError> {
//!     let discoverer = Discoverer::default();
//!
//!     for advertisement in Socket::find_devices(&discoverer)? {
//!         let mut socket = Socket::connect(&advertisement, Transport::new(TransportConfig::default()))?;
//!         println!("{} is {}", socket.device(), socket.state());
//!
//!         socket.turn_on()?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Device kinds
//!
//! - [`Socket`] - switchable outlet: `turn_on`, `turn_off`, `toggle`
//! - [`Sensor`] - motion sensor: `check_for_motion`
//! - [`Link`] - bridge, base capabilities only
//!
//! All three wrap a [`Device`], which owns the address, the cached friendly
//! name and the cached [`BinaryState`]. Queries that get no usable answer
//! leave the [`NO_NAME_FOUND`] and [`BinaryState::Unknown`] sentinels rather
//! than failing.
//!
//! ## Architecture
//!
//! ```text
//! wemo-sdk (devices, registry, commands)
//!     ↓
//! wemo-discovery (SSDP M-SEARCH)    wemo-soap (messages, read-until-match transport)
//! ```

pub mod command;
pub mod logging;

mod config;
mod device;
mod error;
mod link;
mod location;
mod sensor;
mod socket;
mod system;
mod wemo_device;

// Main exports
pub use command::{Command, CommandReply};
pub use config::WemoConfig;
pub use device::{BinaryState, Device, NO_NAME_FOUND};
pub use error::{Result, SdkError};
pub use link::Link;
pub use location::{parse_location, DeviceLocation};
pub use sensor::{MotionStatus, Sensor};
pub use socket::Socket;
pub use system::WemoSystem;
pub use wemo_device::WemoDevice;

// Re-export commonly used types from the lower layers
pub use wemo_discovery::{DeviceAdvertisement, DeviceKind, Discoverer, DiscoveryConfig, SocketFactory};
pub use wemo_soap::{Action, Connector, Service, SoapError, TcpConnector, Transport, TransportConfig};
