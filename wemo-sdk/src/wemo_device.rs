//! Any discovered device, tagged with its kind.

use std::fmt;

use wemo_discovery::{DeviceAdvertisement, DeviceKind};
use wemo_soap::{Connector, TcpConnector, Transport};

use crate::device::{BinaryState, Device};
use crate::error::Result;
use crate::link::Link;
use crate::sensor::Sensor;
use crate::socket::Socket;

/// A device of any kind. Match on the variant to reach kind-specific control.
#[derive(Debug, Clone)]
pub enum WemoDevice<C = TcpConnector> {
    Socket(Socket<C>),
    Sensor(Sensor<C>),
    Link(Link<C>),
}

impl<C: Connector> WemoDevice<C> {
    /// Construct the variant for `kind` from an advertisement.
    pub fn connect(kind: DeviceKind, advertisement: &DeviceAdvertisement, transport: Transport<C>) -> Result<Self> {
        let device = Device::connect(advertisement, transport)?;
        Ok(Self::from_device(kind, device))
    }

    pub fn from_device(kind: DeviceKind, device: Device<C>) -> Self {
        match kind {
            DeviceKind::Socket => WemoDevice::Socket(Socket::from(device)),
            DeviceKind::Sensor => WemoDevice::Sensor(Sensor::from(device)),
            DeviceKind::Link => WemoDevice::Link(Link::from(device)),
        }
    }

    pub fn as_socket_mut(&mut self) -> Option<&mut Socket<C>> {
        match self {
            WemoDevice::Socket(socket) => Some(socket),
            _ => None,
        }
    }

    /// Re-query the state of any kind and cache it
    pub fn refresh_state(&mut self) -> BinaryState {
        self.device_mut().refresh_state()
    }

    fn device_mut(&mut self) -> &mut Device<C> {
        match self {
            WemoDevice::Socket(socket) => socket.device_mut(),
            WemoDevice::Sensor(sensor) => sensor.device_mut(),
            WemoDevice::Link(link) => link.device_mut(),
        }
    }
}

impl<C> WemoDevice<C> {
    pub fn kind(&self) -> DeviceKind {
        match self {
            WemoDevice::Socket(_) => DeviceKind::Socket,
            WemoDevice::Sensor(_) => DeviceKind::Sensor,
            WemoDevice::Link(_) => DeviceKind::Link,
        }
    }

    /// Base capabilities
    pub fn device(&self) -> &Device<C> {
        match self {
            WemoDevice::Socket(socket) => socket.device(),
            WemoDevice::Sensor(sensor) => sensor.device(),
            WemoDevice::Link(link) => link.device(),
        }
    }

    pub fn as_socket(&self) -> Option<&Socket<C>> {
        match self {
            WemoDevice::Socket(socket) => Some(socket),
            _ => None,
        }
    }

    pub fn as_sensor(&self) -> Option<&Sensor<C>> {
        match self {
            WemoDevice::Sensor(sensor) => Some(sensor),
            _ => None,
        }
    }
}

impl<C> fmt::Display for WemoDevice<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.device(), f)
    }
}
