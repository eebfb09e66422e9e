//! Error types for SMS dispatch.

use std::time::Duration;
use thiserror::Error;

/// Result type for SMS operations.
pub type SmsResult<T> = Result<T, SmsError>;

/// Errors that can occur while sending a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    /// The provider answered with an error.
    #[error("provider rejected message (HTTP {status}): {message}")]
    Provider {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider's error message.
        message: String,
    },

    /// The provider could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider did not answer in time.
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered without a confirmation identifier.
    #[error("provider response has no message identifier")]
    MissingConfirmation,

    /// The message was rejected before sending.
    #[error("invalid message: {0}")]
    InvalidRequest(String),
}

impl SmsError {
    /// Returns true if the message never left this process.
    pub fn is_local(&self) -> bool {
        matches!(self, SmsError::InvalidRequest(_))
    }

    /// Returns true if retrying might deliver the message.
    pub fn is_retryable(&self) -> bool {
        match self {
            SmsError::Transport(_) | SmsError::Timeout(_) => true,
            SmsError::Provider { status, .. } => *status == 429 || *status >= 500,
            SmsError::MissingConfirmation | SmsError::InvalidRequest(_) => false,
        }
    }
}
