//! Error types for the server.

use beacon_sms::SmsError;
use beacon_store::StoreError;
use std::net::SocketAddr;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML document is malformed.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document is malformed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file is neither YAML nor JSON.
    #[error("unsupported config file extension: {0:?} (expected .yml, .yaml or .json)")]
    UnsupportedExtension(String),

    /// A setting has an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error while serving.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Document store setup failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// SMS provider setup failed.
    #[error("sms error: {0}")]
    Sms(#[from] SmsError),
}

impl ServerError {
    /// Returns true if fixing the configuration would fix this error.
    pub fn is_config_error(&self) -> bool {
        match self {
            ServerError::Config(_) => true,
            ServerError::Store(e) => e.is_local(),
            ServerError::Sms(e) => e.is_local(),
            ServerError::Io(_) | ServerError::Bind { .. } => false,
        }
    }
}
