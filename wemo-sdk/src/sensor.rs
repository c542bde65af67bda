//! WeMo motion sensor.

use std::ops::Deref;

use wemo_discovery::{DeviceAdvertisement, DeviceKind, Discoverer, SocketFactory};
use wemo_soap::{Connector, TcpConnector, Transport};

use crate::device::Device;
use crate::error::Result;

/// Result of a motion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    /// Motion reporting is not implemented for this device
    Unsupported,
}

/// A WeMo motion sensor: base capabilities plus a motion check.
#[derive(Debug, Clone)]
pub struct Sensor<C = TcpConnector> {
    device: Device<C>,
}

impl Sensor {
    /// Discover sensor advertisements.
    pub fn find_devices<F: SocketFactory>(discoverer: &Discoverer<F>) -> Result<Vec<DeviceAdvertisement>> {
        Ok(discoverer.discover(DeviceKind::Sensor)?)
    }
}

impl<C: Connector> Sensor<C> {
    pub fn connect(advertisement: &DeviceAdvertisement, transport: Transport<C>) -> Result<Self> {
        Device::connect(advertisement, transport).map(Self::from)
    }

    // TODO: subscribe to the sensor's basicevent notifications to report real motion
    pub fn check_for_motion(&self) -> MotionStatus {
        tracing::info!("Checking {} for motion", self.device);
        MotionStatus::Unsupported
    }
}

impl<C> Sensor<C> {
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

impl<C> From<Device<C>> for Sensor<C> {
    fn from(device: Device<C>) -> Self {
        Self { device }
    }
}

impl<C> Deref for Sensor<C> {
    type Target = Device<C>;

    fn deref(&self) -> &Device<C> {
        &self.device
    }
}
