//! Switchable WeMo socket.

use std::ops::Deref;

use wemo_discovery::{DeviceAdvertisement, DeviceKind, Discoverer, SocketFactory};
use wemo_soap::{Action, Connector, Service, SoapError, TcpConnector, Transport};

use crate::device::{BinaryState, Device};
use crate::error::Result;

/// A WeMo smart socket: base capabilities plus on/off control.
///
/// # Example
///
/// ```rust,no_run
/// use wemo_discovery::Discoverer;
/// use wemo_sdk::Socket;
/// use wemo_soap::{Transport, TransportConfig};
///
/// # fn main() -> Result<(), wemo_sdk::SdkError> {
/// for advertisement in Socket::find_devices(&Discoverer::default())? {
///     let mut socket = Socket::connect(&advertisement, Transport::new(TransportConfig::default()))?;
///     socket.toggle()?;
///     println!("{} is now {}", socket.name(), socket.state());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Socket<C = TcpConnector> {
    device: Device<C>,
}

impl Socket {
    /// Discover socket advertisements.
    pub fn find_devices<F: SocketFactory>(discoverer: &Discoverer<F>) -> Result<Vec<DeviceAdvertisement>> {
        Ok(discoverer.discover(DeviceKind::Socket)?)
    }
}

impl<C: Connector> Socket<C> {
    pub fn connect(advertisement: &DeviceAdvertisement, transport: Transport<C>) -> Result<Self> {
        Device::connect(advertisement, transport).map(Self::from)
    }

    /// Switch on. The cached state becomes `ON` before the command is sent,
    /// even if sending fails; re-query to confirm.
    pub fn turn_on(&mut self) -> std::result::Result<(), SoapError> {
        self.switch(BinaryState::On, Action::TurnOn)
    }

    /// Switch off. The cached state becomes `OFF` before the command is sent,
    /// even if sending fails; re-query to confirm.
    pub fn turn_off(&mut self) -> std::result::Result<(), SoapError> {
        self.switch(BinaryState::Off, Action::TurnOff)
    }

    /// Flip the cached state.
    ///
    /// Returns `Ok(false)` without sending anything when the cached state is
    /// unknown; call [`Socket::refresh_state`] first to resolve it.
    pub fn toggle(&mut self) -> std::result::Result<bool, SoapError> {
        match self.device.state() {
            BinaryState::On => self.turn_off().map(|_| true),
            BinaryState::Off => self.turn_on().map(|_| true),
            BinaryState::Unknown => {
                tracing::debug!("Not toggling {}: state unknown", self.device);
                Ok(false)
            }
        }
    }

    pub fn refresh_state(&mut self) -> BinaryState {
        self.device.refresh_state()
    }

    fn switch(&mut self, state: BinaryState, action: Action) -> std::result::Result<(), SoapError> {
        self.device.set_state(state);
        tracing::info!("Switching {} {}", self.device, state);
        self.device.send_command(Service::SetBinaryState, action)
    }
}

impl<C> Socket<C> {
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

impl<C> From<Device<C>> for Socket<C> {
    fn from(device: Device<C>) -> Self {
        Self { device }
    }
}

impl<C> Deref for Socket<C> {
    type Target = Device<C>;

    fn deref(&self) -> &Device<C> {
        &self.device
    }
}
