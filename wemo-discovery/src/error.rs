//! Error types for the discovery system.

use std::fmt;

/// Error type for discovery operations.
///
/// Only socket setup failures reach the caller. A receive timeout while
/// collecting responses closes the search window and is not an error.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Network-related errors (socket creation, bind, multicast join, send)
    NetworkError(String),
    /// An SSDP datagram could not be interpreted
    ParseError(String),
    /// Operation timed out before the search request could be sent
    Timeout,
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DiscoveryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DiscoveryError::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
