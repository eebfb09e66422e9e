//! Check-config command implementation.

use beacon_server::ServerConfig;
use std::path::Path;

/// Loads and validates a configuration file, then prints it with secrets
/// redacted.
pub fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Checking configuration at {:?}", config_path);
    println!();

    let config = ServerConfig::load(config_path)?;
    let shown = serde_json::to_string_pretty(&config.redacted())?;
    println!("{shown}");
    println!();

    config.validate()?;
    let addr = config.socket_addr()?;
    println!("Mode: {}", config.mode_label());
    println!("Listen address: {addr}");
    println!("Configuration OK");
    Ok(())
}
