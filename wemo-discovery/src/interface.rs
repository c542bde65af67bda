//! Selection of the local IPv4 address used for SSDP traffic.
//!
//! An interface counts as active once the kernel reports it has transmitted
//! bytes. The lookup never fails: when nothing qualifies the caller gets the
//! loopback address and discovery proceeds on it.

use std::net::{IpAddr, Ipv4Addr, SocketAddrV4, UdpSocket};

use local_ip_address::list_afinet_netifas;

/// Kernel interface statistics file.
const NET_DEV_PATH: &str = "/proc/net/dev";

/// Gateway used for the routing probe when no interface reports traffic.
pub const DEFAULT_GATEWAY_PROBE: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(192, 168, 0, 1), 80);

/// Per-interface traffic counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceStats {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

impl InterfaceStats {
    /// Whether this interface can carry discovery traffic.
    pub fn is_active(&self) -> bool {
        self.name != "lo" && self.tx_bytes > 0
    }
}

/// Parse the contents of `/proc/net/dev`.
///
/// Lines that do not carry an `iface: counters...` record are skipped.
pub fn parse_net_dev(contents: &str) -> Vec<InterfaceStats> {
    contents
        .lines()
        .filter_map(|line| {
            let (name, counters) = line.split_once(':')?;
            let fields: Vec<u64> = counters
                .split_whitespace()
                .map(|f| f.parse().ok())
                .collect::<Option<_>>()?;
            // receive: bytes packets errs drop fifo frame compressed multicast
            // transmit: bytes ...
            if fields.len() < 9 {
                return None;
            }
            Some(InterfaceStats {
                name: name.trim().to_string(),
                rx_bytes: fields[0],
                tx_bytes: fields[8],
            })
        })
        .collect()
}

/// Address of the interface SSDP traffic should use.
pub fn active_interface_address() -> Ipv4Addr {
    active_interface_address_via(DEFAULT_GATEWAY_PROBE)
}

/// Same as [`active_interface_address`], with an explicit gateway for the
/// routing probe.
pub fn active_interface_address_via(gateway: SocketAddrV4) -> Ipv4Addr {
    if let Some(addr) = address_from_statistics() {
        tracing::debug!("Selected active interface address {}", addr);
        return addr;
    }

    if let Some(addr) = probe_route(gateway) {
        tracing::debug!("Selected interface address {} via route to {}", addr, gateway);
        return addr;
    }

    tracing::warn!("No active network interface found, falling back to loopback");
    Ipv4Addr::LOCALHOST
}

fn address_from_statistics() -> Option<Ipv4Addr> {
    let contents = match std::fs::read_to_string(NET_DEV_PATH) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!("Cannot read {}: {}", NET_DEV_PATH, e);
            return None;
        }
    };

    let active: Vec<String> = parse_net_dev(&contents)
        .into_iter()
        .filter(InterfaceStats::is_active)
        .map(|stats| stats.name)
        .collect();

    let addresses = match list_afinet_netifas() {
        Ok(addresses) => addresses,
        Err(e) => {
            tracing::warn!("Failed to list network interfaces: {}", e);
            return None;
        }
    };

    select_address(&active, &addresses)
}

/// First IPv4, non-loopback address belonging to one of `active`, in the
/// order the interfaces appear in the kernel statistics.
fn select_address(active: &[String], addresses: &[(String, IpAddr)]) -> Option<Ipv4Addr> {
    active.iter().find_map(|name| {
        addresses.iter().find_map(|(iface, addr)| match addr {
            IpAddr::V4(v4) if iface == name && !v4.is_loopback() => Some(*v4),
            _ => None,
        })
    })
}

/// Ask the kernel which local address routes toward `gateway`. No packet is sent.
fn probe_route(gateway: SocketAddrV4) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(gateway).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(v4) if !v4.is_unspecified() => Some(v4),
        _ => None,
    }
}
