//! WeMo Link bridge. Only the base capabilities are available.

use std::ops::Deref;

use wemo_discovery::{DeviceAdvertisement, DeviceKind, Discoverer, SocketFactory};
use wemo_soap::{Connector, TcpConnector, Transport};

use crate::device::Device;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Link<C = TcpConnector> {
    device: Device<C>,
}

impl Link {
    /// Discover bridge advertisements.
    pub fn find_devices<F: SocketFactory>(discoverer: &Discoverer<F>) -> Result<Vec<DeviceAdvertisement>> {
        Ok(discoverer.discover(DeviceKind::Link)?)
    }
}

impl<C: Connector> Link<C> {
    pub fn connect(advertisement: &DeviceAdvertisement, transport: Transport<C>) -> Result<Self> {
        Device::connect(advertisement, transport).map(Self::from)
    }
}

impl<C> Link<C> {
    pub fn device(&self) -> &Device<C> {
        &self.device
    }

    pub fn into_device(self) -> Device<C> {
        self.device
    }

    pub(crate) fn device_mut(&mut self) -> &mut Device<C> {
        &mut self.device
    }
}

impl<C> From<Device<C>> for Link<C> {
    fn from(device: Device<C>) -> Self {
        Self { device }
    }
}

impl<C> Deref for Link<C> {
    type Target = Device<C>;

    fn deref(&self) -> &Device<C> {
        &self.device
    }
}
