//! Base device capability shared by every WeMo kind.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::OnceLock;

use regex::Regex;
use wemo_discovery::{DeviceAdvertisement, DeviceKind};
use wemo_soap::{element_pattern, Action, Connector, Service, SoapError, SoapRequest, TcpConnector, Transport};

use crate::error::Result;
use crate::location::{parse_location, DeviceLocation};

/// Friendly name reported when the device never answered the name query.
pub const NO_NAME_FOUND: &str = "NO_NAME_FOUND";

/// On/off status of a device as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryState {
    On,
    Off,
    /// No usable answer to the last state query
    Unknown,
}

impl BinaryState {
    /// Interpret the text of a `<BinaryState>` element.
    ///
    /// Insight sockets append `|`-separated usage fields after the state digit.
    pub fn from_reported(value: &str) -> Self {
        match value.split('|').next().map(str::trim) {
            Some("1") => BinaryState::On,
            Some("0") => BinaryState::Off,
            _ => BinaryState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryState::On => "ON",
            BinaryState::Off => "OFF",
            BinaryState::Unknown => "NO_STATE_FOUND",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BinaryState::Unknown)
    }
}

impl fmt::Display for BinaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn friendly_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| element_pattern("FriendlyName"))
}

fn binary_state_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| element_pattern("BinaryState"))
}

/// A resolved WeMo device and its cached name and state.
///
/// The address never changes after construction. The cached state only
/// changes through control operations or explicit refreshes.
#[derive(Debug, Clone)]
pub struct Device<C = TcpConnector> {
    location: DeviceLocation,
    usn: Option<String>,
    service_type: Option<String>,
    name: String,
    state: BinaryState,
    transport: Transport<C>,
}

impl<C: Connector> Device<C> {
    /// Resolve an advertisement and query the device's name and state.
    ///
    /// Fails only on a malformed location. Unanswered queries leave the
    /// [`NO_NAME_FOUND`] and [`BinaryState::Unknown`] sentinels in place.
    pub fn connect(advertisement: &DeviceAdvertisement, transport: Transport<C>) -> Result<Self> {
        let location = parse_location(&advertisement.location)?;
        let mut device = Self {
            location,
            usn: advertisement.usn.clone(),
            service_type: advertisement.service_type.clone(),
            name: NO_NAME_FOUND.to_string(),
            state: BinaryState::Unknown,
            transport,
        };
        device.name = device.query_friendly_name();
        device.state = device.query_binary_state();
        tracing::debug!("Connected to {} [{}]", device, device.state);
        Ok(device)
    }

    /// Same as [`Device::connect`] for a bare location URL.
    pub fn from_location(location: &str, transport: Transport<C>) -> Result<Self> {
        Self::connect(&DeviceAdvertisement::from_location(location), transport)
    }

    pub fn ip(&self) -> IpAddr {
        self.location.ip
    }

    pub fn port(&self) -> u16 {
        self.location.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.location.socket_addr()
    }

    pub fn base_url(&self) -> &str {
        &self.location.base_url
    }

    pub fn location(&self) -> &str {
        &self.location.url
    }

    pub fn usn(&self) -> Option<&str> {
        self.usn.as_deref()
    }

    pub fn service_type(&self) -> Option<&str> {
        self.service_type.as_deref()
    }

    /// Kind declared by the advertisement, if it carried a service type
    pub fn advertised_kind(&self) -> Option<DeviceKind> {
        self.service_type.as_deref().and_then(DeviceKind::from_search_target)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> BinaryState {
        self.state
    }

    /// Ask the device for its friendly name; [`NO_NAME_FOUND`] if it never says.
    pub fn query_friendly_name(&self) -> String {
        let request = SoapRequest::for_action(Action::GetName, &self.host_header());
        match self.exchange(&request, friendly_name_pattern()) {
            Ok(found) => found.value().trim().to_string(),
            Err(e) => {
                tracing::debug!("Name query to {} failed: {}", self.socket_addr(), e);
                NO_NAME_FOUND.to_string()
            }
        }
    }

    /// Ask the device for its on/off state.
    pub fn query_binary_state(&self) -> BinaryState {
        let request = SoapRequest::for_action(Action::GetState, &self.host_header());
        match self.exchange(&request, binary_state_pattern()) {
            Ok(found) => BinaryState::from_reported(found.value()),
            Err(e) => {
                tracing::debug!("State query to {} failed: {}", self.socket_addr(), e);
                BinaryState::Unknown
            }
        }
    }

    /// Re-query the friendly name and cache it
    pub fn refresh_name(&mut self) -> &str {
        self.name = self.query_friendly_name();
        &self.name
    }

    /// Re-query the state and cache it
    pub fn refresh_state(&mut self) -> BinaryState {
        self.state = self.query_binary_state();
        self.state
    }

    /// Send a request without waiting for confirmation.
    ///
    /// `service` and `action` must form one of the supported pairs, otherwise
    /// nothing is sent and [`SoapError::InvalidRequest`] is returned.
    pub fn send_command(&self, service: Service, action: Action) -> std::result::Result<(), SoapError> {
        let request = SoapRequest::build(service, action, &self.host_header());
        if request.is_empty() {
            return Err(SoapError::InvalidRequest(format!(
                "{:?} is not an action of {}",
                action, service
            )));
        }
        self.transport.send_command(self.ip(), self.port(), &request)
    }

    pub(crate) fn set_state(&mut self, state: BinaryState) {
        self.state = state;
    }

    fn exchange(&self, request: &SoapRequest, pattern: &Regex) -> std::result::Result<wemo_soap::ResponseMatch, SoapError> {
        self.transport.exchange(self.ip(), self.port(), request, pattern)
    }

    fn host_header(&self) -> String {
        self.socket_addr().to_string()
    }
}

impl<C> fmt::Display for Device<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}:{}", self.name, self.location.ip, self.location.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_state_from_reported() {
        assert_eq!(BinaryState::from_reported("1"), BinaryState::On);
        assert_eq!(BinaryState::from_reported(" 0 "), BinaryState::Off);
        assert_eq!(BinaryState::from_reported("1|1381178442|0|0|0"), BinaryState::On);
        assert_eq!(BinaryState::from_reported("8"), BinaryState::Unknown);
        assert_eq!(BinaryState::from_reported(""), BinaryState::Unknown);
        assert_eq!(BinaryState::from_reported("Error"), BinaryState::Unknown);
    }

    #[test]
    fn test_binary_state_display() {
        assert_eq!(BinaryState::On.to_string(), "ON");
        assert_eq!(BinaryState::Off.to_string(), "OFF");
        assert_eq!(BinaryState::Unknown.to_string(), "NO_STATE_FOUND");
        assert!(!BinaryState::Unknown.is_known());
    }

    #[test]
    fn test_malformed_location_fails_before_io() {
        // Rejected before any connection is attempted
        let result = Device::<TcpConnector>::from_location("http://192.168.1.50/setup.xml", Transport::default());
        assert!(matches!(result, Err(crate::SdkError::InvalidLocation { .. })));
    }
}
