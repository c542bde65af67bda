//! Discover one kind of WeMo device and print the advertisements as JSON
//!
//! Usage: cargo run -p wemo-sdk-discovery --example discover_json -- [socket|sensor|link] [timeout_ms]

use std::time::Duration;

use wemo_discovery::{discover_with_timeout, DeviceKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let kind: DeviceKind = args.next().as_deref().unwrap_or("socket").parse()?;
    let timeout = args
        .next()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(wemo_discovery::DEFAULT_TIMEOUT);

    let advertisements = discover_with_timeout(kind, timeout)?;
    println!("{}", serde_json::to_string_pretty(&advertisements)?);
    Ok(())
}
