//! # Beacon Server
//!
//! HTTP server that acknowledges client pings and relays test SMS
//! messages, keeping an audit trail of both in a document store.
//!
//! This crate provides:
//! - HTTP endpoints (`POST /api/ping`, `POST /api/send_test_message`,
//!   `GET /healthz`)
//! - Request body validation with structured failure responses
//! - The [`AuditLogger`] over a [`beacon_store::DocumentStore`]
//! - Configuration loading from YAML or JSON
//!
//! # Responses
//!
//! Every endpoint answers with a status envelope:
//!
//! ```text
//! {"Status": "Success"}
//! {"Status": "Fail", "Cause": "Missing required keys from request body: Client ID"}
//! ```
//!
//! Malformed bodies are refused with `400` before any store or provider
//! call. A failed SMS send answers `502`. Audit failures never change the
//! response.
//!
//! # Wiring
//!
//! ```rust,ignore
//! use beacon_server::{App, ServerConfig};
//!
//! let config = ServerConfig::load("config.yml")?;
//! let app = App::from_config(&config)?;
//! app.serve(config.socket_addr()?, shutdown_signal()).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod app;
mod audit;
mod config;
mod error;
pub mod handlers;
mod validation;

pub use app::App;
pub use audit::{ping_event, sms_event, AuditLogger, PING_LOG_DOCUMENT, SMS_LOG_DOCUMENT};
pub use config::{DatabaseType, ServerConfig};
pub use error::{ConfigError, ConfigResult, ServerError, ServerResult};
pub use handlers::{AppState, StatusBody};
pub use validation::{parse_body, require_strings, ValidationFailure};
