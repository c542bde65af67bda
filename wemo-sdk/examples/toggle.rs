//! Discover every WeMo device and run one command against them
//!
//! Usage: cargo run -p wemo-sdk --example toggle -- "toggle_cmd Kitchen Lamp"
//!
//! Set WEMO_LOG_MODE=development to see discovery and transport logs.

use wemo_sdk::logging::init_logging_from_env;
use wemo_sdk::{Command, WemoConfig, WemoSystem};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let input = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let command = if input.trim().is_empty() {
        Command::parse("list_cmd")?
    } else {
        Command::parse(&input)?
    };

    let mut system = WemoSystem::with_config(WemoConfig::from_env()?)?;
    let reply = system.execute(&command);

    println!("{}", reply);
    if !reply.success {
        std::process::exit(1);
    }
    Ok(())
}
