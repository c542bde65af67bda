use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid location URL '{url}': {reason}")]
    InvalidLocation { url: String, reason: String },

    #[error("Discovery error: {0}")]
    Discovery(#[from] wemo_discovery::DiscoveryError),

    #[error("SOAP error: {0}")]
    Soap(#[from] wemo_soap::SoapError),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SdkError {
    pub(crate) fn invalid_location(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
