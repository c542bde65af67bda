//! SOAP request construction for the WeMo `basicevent` service.
//!
//! A [`SoapRequest`] is always built as a header and body pair for the same
//! action. `Content-Length` is computed from the body when the request is
//! built.

use std::fmt;

/// Control URL every supported action is posted to.
pub const CONTROL_PATH: &str = "/upnp/control/basicevent1";

/// Service URN of the WeMo basic event service.
pub const SERVICE_URN: &str = "urn:Belkin:service:basicevent:1";

/// SOAP services (remote procedures) a WeMo device accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    SetBinaryState,
    GetBinaryState,
    GetFriendlyName,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::SetBinaryState => "SetBinaryState",
            Service::GetBinaryState => "GetBinaryState",
            Service::GetFriendlyName => "GetFriendlyName",
        }
    }

    /// Value of the `SOAPAction` header, quotes included
    pub fn soap_action(&self) -> String {
        format!("\"{}#{}\"", SERVICE_URN, self.name())
    }

    /// Look up a service by its protocol name or its short alias
    /// (`SET_BIN_STATE`, `GET_BIN_STATE`, `GET_FRIEND_NAME`). Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SETBINARYSTATE" | "SET_BIN_STATE" => Some(Service::SetBinaryState),
            "GETBINARYSTATE" | "GET_BIN_STATE" => Some(Service::GetBinaryState),
            "GETFRIENDLYNAME" | "GET_FRIEND_NAME" => Some(Service::GetFriendlyName),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Request bodies, each belonging to exactly one [`Service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TurnOn,
    TurnOff,
    GetName,
    GetState,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::TurnOn, Action::TurnOff, Action::GetName, Action::GetState];

    /// The only service this action's body can be sent to
    pub fn service(&self) -> Service {
        match self {
            Action::TurnOn | Action::TurnOff => Service::SetBinaryState,
            Action::GetName => Service::GetFriendlyName,
            Action::GetState => Service::GetBinaryState,
        }
    }

    /// Case-insensitive lookup by short name (`TURN_ON`, `TURN_OFF`, `GET_NAME`, `GET_STATE`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "TURN_ON" | "TURNON" => Some(Action::TurnOn),
            "TURN_OFF" | "TURNOFF" => Some(Action::TurnOff),
            "GET_NAME" | "GETNAME" => Some(Action::GetName),
            "GET_STATE" | "GETSTATE" => Some(Action::GetState),
            _ => None,
        }
    }

    fn body(&self) -> String {
        let inner = match self {
            Action::TurnOn => set_binary_state("1"),
            Action::TurnOff => set_binary_state("0"),
            Action::GetName => format!(
                "\t<m:GetFriendlyName xmlns:m=\"{SERVICE_URN}\">\n\
                 <FriendlyName></FriendlyName>\n\
                 \t</m:GetFriendlyName>\n"
            ),
            Action::GetState => format!(
                "\t<m:GetBinaryState xmlns:m=\"{SERVICE_URN}\">\n\
                 \n\
                 \t</m:GetBinaryState>\n"
            ),
        };
        envelope(&inner)
    }
}

fn set_binary_state(value: &str) -> String {
    format!(
        "\t<m:SetBinaryState xmlns:m=\"{SERVICE_URN}\">\n\
         <BinaryState>{value}</BinaryState>\n\
         \t</m:SetBinaryState>\n"
    )
}

fn envelope(inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n\
         <SOAP-ENV:Envelope xmlns:SOAP-ENV=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         SOAP-ENV:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">\n\
         <SOAP-ENV:Body>\n\
         {inner}\
         </SOAP-ENV:Body>\n\
         </SOAP-ENV:Envelope>"
    )
}

/// A matched HTTP header and SOAP body, ready to write to a device socket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoapRequest {
    header: String,
    body: String,
}

impl SoapRequest {
    /// Build the request for `action` addressed to `host` ("ip:port").
    pub fn for_action(action: Action, host: &str) -> Self {
        let service = action.service();
        let body = action.body();
        let header = format!(
            "POST {CONTROL_PATH} HTTP/1.1\r\n\
             SOAPAction: {}\r\n\
             Host: {host}\r\n\
             Content-Type: text/xml\r\n\
             Content-Length: {}\r\n\
             \r\n",
            service.soap_action(),
            body.len()
        );
        Self { header, body }
    }

    /// Build a request from a service and an action.
    ///
    /// Only the four pairs where `action.service() == service` produce a
    /// request; any other pairing yields an empty one.
    pub fn build(service: Service, action: Action, host: &str) -> Self {
        if action.service() != service {
            tracing::debug!("No request for action {:?} on service {}", action, service);
            return Self::default();
        }
        Self::for_action(action, host)
    }

    /// Build a request from textual names; unknown names yield an empty request.
    pub fn build_named(service: &str, action: &str, host: &str) -> Self {
        match (Service::from_name(service), Action::from_name(action)) {
            (Some(service), Some(action)) => Self::build(service, action, host),
            _ => Self::default(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.is_empty()
    }

    /// Byte length of the body, as declared in the header
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Header followed by body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.header.len() + self.body.len());
        bytes.extend_from_slice(self.header.as_bytes());
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}
