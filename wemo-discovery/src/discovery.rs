//! Core discovery logic.
//!
//! One discovery call is one best-effort broadcast window:
//! 1. Pick the local interface address (or use the configured one)
//! 2. Open a multicast socket through the [`SocketFactory`]
//! 3. Send a single M-SEARCH for the kind's search target
//! 4. Collect responses until a receive times out
//! 5. Deduplicate advertisements, keeping arrival order

use std::collections::HashSet;
use std::net::Ipv4Addr;

use crate::error::Result;
use crate::interface::active_interface_address_via;
use crate::ssdp::{MulticastSocketFactory, SocketFactory, SsdpClient, SsdpResponse};
use crate::{DeviceAdvertisement, DeviceKind, DiscoveryConfig};

/// Runs SSDP searches for WeMo devices.
///
/// # Examples
///
/// ```no_run
/// use wemo_discovery::{Discoverer, DeviceKind, DiscoveryConfig};
///
/// let discoverer = Discoverer::new(DiscoveryConfig::default());
/// for advertisement in discoverer.discover(DeviceKind::Socket)? {
///     println!("{}", advertisement.location);
/// }
/// # Ok::<(), wemo_discovery::DiscoveryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Discoverer<F = MulticastSocketFactory> {
    factory: F,
    config: DiscoveryConfig,
}

impl Discoverer<MulticastSocketFactory> {
    /// Create a discoverer using real multicast sockets
    pub fn new(config: DiscoveryConfig) -> Self {
        Self::with_factory(MulticastSocketFactory, config)
    }
}

impl Default for Discoverer<MulticastSocketFactory> {
    fn default() -> Self {
        Self::new(DiscoveryConfig::default())
    }
}

impl<F: SocketFactory> Discoverer<F> {
    /// Create a discoverer with a custom socket factory
    pub fn with_factory(factory: F, config: DiscoveryConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover all devices advertising `kind`'s service type.
    ///
    /// Only replies whose `ST` names `kind` are kept; multicast `NOTIFY`
    /// traffic and replies for other service types are dropped. Returns
    /// advertisements in arrival order, each one at most once. An empty
    /// network yields an empty list.
    pub fn discover(&self, kind: DeviceKind) -> Result<Vec<DeviceAdvertisement>> {
        let bind = self.bind_address();
        tracing::debug!("Searching for {} devices from {}", kind, bind);

        let socket = self.factory.open(bind, self.config.timeout)?;
        let client = SsdpClient::new(socket, self.config.chunk_size);

        let mut seen = HashSet::new();
        let mut advertisements = Vec::new();

        for result in client.search(kind.search_target())? {
            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Stopping {} search early: {}", kind, e);
                    break;
                }
            };

            let advertisement = DeviceAdvertisement::from(response);
            if advertisement.kind() != Some(kind) {
                tracing::trace!(
                    "Ignoring {} from {} during {} search",
                    advertisement.service_type.as_deref().unwrap_or("untyped datagram"),
                    advertisement.location,
                    kind
                );
                continue;
            }

            if seen.insert(advertisement.clone()) {
                tracing::debug!("Found {} at {}", kind, advertisement.location);
                advertisements.push(advertisement);
            }
        }

        if advertisements.is_empty() {
            tracing::info!(
                "Search time ({:.1} seconds) expired, no {} device was found",
                self.config.timeout.as_secs_f32(),
                kind
            );
        }

        Ok(advertisements)
    }

    /// Discover by kind name ("socket", "sensor", "link").
    ///
    /// An unrecognised name returns an empty list without touching the network.
    pub fn discover_named(&self, kind: &str) -> Result<Vec<DeviceAdvertisement>> {
        match kind.parse::<DeviceKind>() {
            Ok(kind) => self.discover(kind),
            Err(_) => {
                tracing::debug!("Ignoring discovery for unknown device kind '{}'", kind);
                Ok(Vec::new())
            }
        }
    }

    fn bind_address(&self) -> Ipv4Addr {
        self.config
            .interface
            .unwrap_or_else(|| active_interface_address_via(self.config.gateway_probe))
    }
}

impl From<SsdpResponse> for DeviceAdvertisement {
    fn from(response: SsdpResponse) -> Self {
        Self {
            location: response.location,
            usn: response.usn,
            service_type: response.st,
        }
    }
}
