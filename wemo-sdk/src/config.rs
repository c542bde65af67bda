//! SDK configuration.
//!
//! Timeouts and budgets are carried explicitly into every discovery and
//! transport call; nothing here touches process-wide socket defaults.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use wemo_discovery::DiscoveryConfig;
use wemo_soap::TransportConfig;

use crate::error::{Result, SdkError};

/// Combined discovery and transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WemoConfig {
    pub discovery: DiscoveryConfig,
    pub transport: TransportConfig,
}

impl WemoConfig {
    /// Use `timeout` for both the discovery window and device sockets
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.discovery.timeout = timeout;
        self.transport.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.transport.max_attempts = max_attempts;
        self
    }

    /// Bind discovery to `interface` instead of detecting the active one
    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.discovery.interface = Some(interface);
        self
    }

    pub fn with_gateway(mut self, gateway: SocketAddrV4) -> Self {
        self.discovery.gateway_probe = gateway;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.discovery.timeout.is_zero() || self.transport.timeout.is_zero() {
            return Err(SdkError::Config("Timeout must be positive".to_string()));
        }

        if self.transport.max_attempts == 0 {
            return Err(SdkError::Config("Max attempts must be at least 1".to_string()));
        }

        if self.discovery.chunk_size == 0 || self.transport.chunk_size == 0 {
            return Err(SdkError::Config("Chunk size must be positive".to_string()));
        }

        Ok(())
    }

    /// Defaults overridden by environment variables:
    ///
    /// - `WEMO_TIMEOUT_MS`: discovery and socket timeout in milliseconds
    /// - `WEMO_MAX_ATTEMPTS`: reads allowed per device query
    /// - `WEMO_INTERFACE`: IPv4 address to bind discovery to
    /// - `WEMO_GATEWAY`: `ip:port` used to find the active interface
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(timeout) = lookup("WEMO_TIMEOUT_MS") {
            let millis: u64 = parse_var("WEMO_TIMEOUT_MS", &timeout)?;
            config = config.with_timeout(Duration::from_millis(millis));
        }

        if let Some(attempts) = lookup("WEMO_MAX_ATTEMPTS") {
            config = config.with_max_attempts(parse_var("WEMO_MAX_ATTEMPTS", &attempts)?);
        }

        if let Some(interface) = lookup("WEMO_INTERFACE") {
            config = config.with_interface(parse_var("WEMO_INTERFACE", &interface)?);
        }

        if let Some(gateway) = lookup("WEMO_GATEWAY") {
            config = config.with_gateway(parse_var("WEMO_GATEWAY", &gateway)?);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SdkError::Config(format!("Invalid {} environment variable: '{}'", name, value)))
}
