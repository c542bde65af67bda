//! Error types for the SOAP client

use std::io;

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Connect, send or receive failed
    #[error("Network error: {0}")]
    Network(String),

    /// The device did not answer within the socket timeout
    #[error("Timed out waiting for device")]
    Timeout,

    /// The response never matched within the read budget
    #[error("No matching response after {attempts} read(s)")]
    NotFound { attempts: usize },

    /// The request has no content to send
    #[error("Invalid SOAP request: {0}")]
    InvalidRequest(String),
}

impl From<io::Error> for SoapError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SoapError::Timeout,
            _ => SoapError::Network(error.to_string()),
        }
    }
}
