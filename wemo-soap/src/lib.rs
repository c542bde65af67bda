//! Private SOAP client for WeMo device communication
//!
//! Two halves:
//! - [`message`] builds the header and body for the four supported
//!   `basicevent` requests.
//! - [`transport`] writes a request to a device over TCP and reads the reply
//!   until a pattern matches, within a bounded number of reads.

pub mod message;
pub mod transport;

mod error;

pub use error::SoapError;
pub use message::{Action, Service, SoapRequest};
pub use transport::{
    element_pattern, read_until_match, Connector, ResponseMatch, TcpConnector, Transport, TransportConfig,
};
