//! # Beacon SMS
//!
//! Outbound text messages through an external provider.
//!
//! [`Dispatcher`] turns provider calls into a plain success flag:
//! a message counts as sent only when the provider returned a
//! confirmation identifier. Provider, transport, and timeout faults are
//! logged and reported as `false`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use beacon_sms::{Dispatcher, TwilioConfig, TwilioProvider};
//! use std::time::Duration;
//!
//! # async fn run() -> beacon_sms::SmsResult<()> {
//! let config = TwilioConfig::new("AC123", "auth-token", "+15550000000");
//! let from = config.from_phone.clone();
//! let provider = TwilioProvider::new(config, Duration::from_secs(10))?;
//! let dispatcher = Dispatcher::new(provider, from);
//!
//! let sent = dispatcher.dispatch("hello", "+15551234567").await;
//! println!("sent: {sent}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod dispatcher;
mod error;
mod provider;
pub mod twilio;

pub use dispatcher::{Dispatcher, DEFAULT_TIMEOUT};
pub use error::{SmsError, SmsResult};
pub use provider::{MessageReceipt, OutboundMessage, SmsProvider};
pub use twilio::{TwilioConfig, TwilioProvider};
