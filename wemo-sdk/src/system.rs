//! WemoSystem - registry of discovered devices, indexed by friendly name.

use std::collections::HashMap;

use wemo_discovery::{DeviceKind, Discoverer, SocketFactory};
use wemo_soap::{Connector, TcpConnector, Transport};

use crate::command::{Command, CommandReply, Target, Verb};
use crate::config::WemoConfig;
use crate::error::{Result, SdkError};
use crate::socket::Socket;
use crate::wemo_device::WemoDevice;

/// Every reachable WeMo device on the network.
///
/// # Example
///
/// ```rust,no_run
/// use wemo_sdk::{Command, WemoSystem};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut system = WemoSystem::new()?;
///     for name in system.names() {
///         println!("found {}", name);
///     }
///
///     let reply = system.execute(&Command::parse("off_cmd all")?);
///     println!("{}", reply);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WemoSystem<C = TcpConnector> {
    devices: HashMap<String, WemoDevice<C>>,
}

impl WemoSystem {
    /// Discover every kind of device with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(WemoConfig::default())
    }

    pub fn with_config(config: WemoConfig) -> Result<Self> {
        config.validate()?;
        let discoverer = Discoverer::new(config.discovery);
        Self::discover_with(&discoverer, Transport::new(config.transport))
    }
}

impl<C: Connector + Clone> WemoSystem<C> {
    /// Discover all kinds through `discoverer` and connect each device over
    /// `transport`.
    ///
    /// Discovery failures abort. Advertisements whose location cannot be
    /// parsed are skipped.
    pub fn discover_with<F: SocketFactory>(discoverer: &Discoverer<F>, transport: Transport<C>) -> Result<Self> {
        let mut devices = Vec::new();

        for kind in DeviceKind::ALL {
            for advertisement in discoverer.discover(kind)? {
                match WemoDevice::connect(kind, &advertisement, transport.clone()) {
                    Ok(device) => devices.push(device),
                    Err(e) => tracing::warn!("Skipping {} advertisement: {}", kind, e),
                }
            }
        }

        tracing::info!("Connected to {} WeMo device(s)", devices.len());
        Ok(Self::from_devices(devices))
    }
}

impl<C: Connector> WemoSystem<C> {
    /// Index pre-built devices by friendly name.
    ///
    /// Names are unique ignoring case. A repeated name is registered as
    /// `"<name> (<ip>)"`, then `"<name> (<ip>) #2"` and so on.
    pub fn from_devices(devices: Vec<WemoDevice<C>>) -> Self {
        let mut indexed: HashMap<String, WemoDevice<C>> = HashMap::with_capacity(devices.len());

        for device in devices {
            let name = device.device().name();
            let mut key = name.to_string();
            if is_taken(&indexed, &key) {
                let ip = device.device().ip();
                key = format!("{} ({})", name, ip);
                let mut suffix = 2;
                while is_taken(&indexed, &key) {
                    key = format!("{} ({}) #{}", name, ip, suffix);
                    suffix += 1;
                }
                tracing::warn!("Duplicate device name '{}', registering as '{}'", name, key);
            }
            indexed.insert(key, device);
        }

        Self { devices: indexed }
    }

    /// Look up a device by friendly name, ignoring case
    pub fn device(&self, name: &str) -> Option<&WemoDevice<C>> {
        let key = self.key_for(name)?;
        self.devices.get(&key)
    }

    pub fn device_mut(&mut self, name: &str) -> Option<&mut WemoDevice<C>> {
        let key = self.key_for(name)?;
        self.devices.get_mut(&key)
    }

    /// The socket called `name`, for direct control
    pub fn socket_mut(&mut self, name: &str) -> Result<&mut Socket<C>> {
        self.device_mut(name)
            .and_then(WemoDevice::as_socket_mut)
            .ok_or_else(|| SdkError::DeviceNotFound(format!("no socket named '{}'", name)))
    }

    /// All devices, ordered by name
    pub fn devices(&self) -> Vec<&WemoDevice<C>> {
        self.names().iter().filter_map(|name| self.devices.get(name)).collect()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.devices.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Run one relay command and describe the outcome.
    ///
    /// Every affected device contributes one `"<name> - <ip>:<port> [<STATE>]"`
    /// line, or a line saying why it could not be handled.
    pub fn execute(&mut self, command: &Command) -> CommandReply {
        tracing::debug!("Executing '{}'", command);

        let mut names = self.matching_names(&command.target);
        if command.verb != Verb::List && command.verb != Verb::State && command.target == Target::All {
            names.retain(|name| matches!(self.devices.get(name), Some(WemoDevice::Socket(_))));
        }

        if names.is_empty() {
            return match &command.target {
                Target::All if command.verb == Verb::List => CommandReply::ok("No devices found"),
                Target::All => CommandReply::failed("No devices found"),
                Target::Named(name) => CommandReply::failed(format!("No device named '{}'", name)),
            };
        }

        let mut success = true;
        let mut lines = Vec::with_capacity(names.len());

        for name in names {
            let Some(device) = self.devices.get_mut(&name) else {
                continue;
            };

            let line = match command.verb {
                Verb::List => Ok(()),
                Verb::State => {
                    device.refresh_state();
                    Ok(())
                }
                Verb::On | Verb::Off | Verb::Toggle => apply(command.verb, device),
            };

            match line {
                Ok(()) => lines.push(format!("{} [{}]", device, device.device().state())),
                Err(reason) => {
                    success = false;
                    lines.push(reason);
                }
            }
        }

        CommandReply {
            success,
            text: lines.join("\n"),
        }
    }

    fn matching_names(&self, target: &Target) -> Vec<String> {
        self.names().into_iter().filter(|name| target.matches(name)).collect()
    }

    fn key_for(&self, name: &str) -> Option<String> {
        if self.devices.contains_key(name) {
            return Some(name.to_string());
        }
        self.devices.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned()
    }
}

fn is_taken<C>(devices: &HashMap<String, WemoDevice<C>>, key: &str) -> bool {
    devices.keys().any(|existing| existing.eq_ignore_ascii_case(key))
}

fn apply<C: Connector>(verb: Verb, device: &mut WemoDevice<C>) -> std::result::Result<(), String> {
    let description = device.to_string();
    let kind = device.kind();
    let Some(socket) = device.as_socket_mut() else {
        return Err(format!("{} is a {}, not a socket", description, kind));
    };

    let result = match verb {
        Verb::On => socket.turn_on().map(|_| true),
        Verb::Off => socket.turn_off().map(|_| true),
        Verb::Toggle => socket.toggle(),
        Verb::State | Verb::List => Ok(true),
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(format!("{} [{}]: state unknown, not toggled", description, socket.state())),
        Err(e) => {
            tracing::warn!("{} {} failed: {}", verb.as_str(), description, e);
            Err(format!("{}: {} failed: {}", description, verb.as_str(), e))
        }
    }
}
