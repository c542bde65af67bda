//! Device location URL parsing.
//!
//! WeMo devices advertise `http://<ip>:<port>/setup.xml`; the control endpoint
//! lives on the same host and port.

use std::net::{IpAddr, SocketAddr};

use url::{Host, Url};

use crate::error::{Result, SdkError};

/// A device endpoint resolved from its advertised location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLocation {
    /// Location as advertised, without a trailing slash
    pub url: String,
    pub ip: IpAddr,
    pub port: u16,
    /// `http://<ip>:<port>`
    pub base_url: String,
}

impl DeviceLocation {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

/// Parse a location URL into the device's address.
///
/// The scheme must be `http`, the host an IP literal, and the port explicit.
pub fn parse_location(location: &str) -> Result<DeviceLocation> {
    let trimmed = location.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let url = Url::parse(trimmed).map_err(|e| SdkError::invalid_location(location, e.to_string()))?;

    if url.scheme() != "http" {
        return Err(SdkError::invalid_location(
            location,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    let ip = match url.host() {
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip),
        Some(Host::Domain(domain)) => {
            return Err(SdkError::invalid_location(
                location,
                format!("host '{}' is not an IP address", domain),
            ))
        }
        None => return Err(SdkError::invalid_location(location, "missing host")),
    };

    if !has_explicit_port(trimmed) {
        return Err(SdkError::invalid_location(location, "missing port"));
    }
    // An explicit ":80" is normalised away by the parser.
    let port = url
        .port_or_known_default()
        .ok_or_else(|| SdkError::invalid_location(location, "missing port"))?;

    Ok(DeviceLocation {
        url: trimmed.to_string(),
        ip,
        port,
        base_url: format!("http://{}", SocketAddr::new(ip, port)),
    })
}

fn has_explicit_port(url: &str) -> bool {
    let authority = url
        .split_once("://")
        .map(|(_, rest)| rest.split(['/', '?', '#']).next().unwrap_or_default())
        .unwrap_or_default();
    match authority.rsplit_once(':') {
        Some((_, port)) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
