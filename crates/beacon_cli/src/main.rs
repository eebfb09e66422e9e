//! Beacon CLI
//!
//! Runs and inspects the Beacon ping / SMS relay server.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `check-config` - Validate a configuration file and print it
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Beacon ping and SMS relay server.
#[derive(Parser)]
#[command(name = "beacon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (YAML or JSON)
    #[arg(global = true, short, long, default_value = "config.yml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate the configuration and print the effective settings
    CheckConfig,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve { host, port } => {
            commands::serve::run(&cli.config, host, port).await?;
        }
        Commands::CheckConfig => {
            commands::check_config::run(&cli.config)?;
        }
        Commands::Version => {
            println!("Beacon CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
