//! Textual commands of the form `<verb>_cmd [target]`.
//!
//! ```rust
//! use wemo_sdk::command::{Command, Target, Verb};
//!
//! let command: Command = "off_cmd Kitchen Lamp".parse().unwrap();
//! assert_eq!(command.verb, Verb::Off);
//! assert_eq!(command.target, Target::Named("Kitchen Lamp".to_string()));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Malformed command '{0}': expected <verb>_cmd [target]")]
    Malformed(String),

    #[error("Unknown verb '{0}'")]
    UnknownVerb(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    On,
    Off,
    Toggle,
    State,
    List,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::On => "on",
            Verb::Off => "off",
            Verb::Toggle => "toggle",
            Verb::State => "state",
            Verb::List => "list",
        }
    }
}

impl FromStr for Verb {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(Verb::On),
            "off" => Ok(Verb::Off),
            "toggle" => Ok(Verb::Toggle),
            "state" => Ok(Verb::State),
            "list" => Ok(Verb::List),
            _ => Err(CommandError::UnknownVerb(s.to_string())),
        }
    }
}

/// Which devices a command applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    All,
    /// A friendly name, matched case-insensitively
    Named(String),
}

impl Target {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Target::All => true,
            Target::Named(wanted) => wanted.eq_ignore_ascii_case(name),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => f.write_str("all"),
            Target::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    pub verb: Verb,
    pub target: Target,
}

fn command_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*([a-z]+)_cmd(?:\s+(.*?))?\s*$")
            .unwrap_or_else(|e| unreachable!("command pattern is valid: {}", e))
    })
}

impl Command {
    pub fn new(verb: Verb, target: Target) -> Self {
        Self { verb, target }
    }

    /// Parse `<verb>_cmd [target]`. A missing target means every device.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        if input.trim().is_empty() {
            return Err(CommandError::Empty);
        }

        let captures = command_pattern()
            .captures(input)
            .ok_or_else(|| CommandError::Malformed(input.trim().to_string()))?;

        let verb = captures[1].parse()?;
        let target = match captures.get(2).map(|m| m.as_str().trim()) {
            None | Some("") => Target::All,
            Some(name) if name.eq_ignore_ascii_case("all") => Target::All,
            Some(name) => Target::Named(name.to_string()),
        };

        Ok(Self { verb, target })
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_cmd {}", self.verb.as_str(), self.target)
    }
}

/// Outcome of a command, as text for the relay to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub success: bool,
    pub text: String,
}

impl CommandReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { success: true, text: text.into() }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self { success: false, text: text.into() }
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
