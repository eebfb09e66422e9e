//! Serve command implementation.

use beacon_server::{App, ServerConfig};
use std::path::Path;
use tracing::{error, info, warn};

/// Runs the serve command until Ctrl-C.
pub async fn run(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::load(config_path)?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }

    let app = App::from_config(&config).inspect_err(|e| {
        if e.is_config_error() {
            error!(config = ?config_path, "invalid configuration; run `beacon check-config` for details");
        }
    })?;
    let addr = config.socket_addr()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = config.mode_label(),
        debug = config.debug_mode,
        database_type = %config.database_type,
        "starting Beacon server"
    );

    app.serve(addr, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => warn!(error = %e, "failed to listen for Ctrl-C; shutting down"),
    }
}
