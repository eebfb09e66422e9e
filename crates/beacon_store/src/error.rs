//! Error types for document store operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the document store.
///
/// Variants split into two families. Local validation failures
/// (`InvalidPath`, `InvalidPayloadShape`, `InvalidQuery`,
/// `ConfigurationMismatch`) mean the request was never sent. Remote
/// failures (`RemoteFault`, `Timeout`) mean it was sent and the store
/// rejected it or did not answer in time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The path is not a well-formed document or collection path.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The document payload does not have the required shape.
    #[error("invalid payload: {reason}")]
    InvalidPayloadShape {
        /// Why it was rejected.
        reason: String,
    },

    /// A query specification could not be turned into a filter.
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// Why it was rejected.
        reason: String,
    },

    /// No document exists at the path.
    #[error("document not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// The backing store failed or rejected the request.
    #[error("remote store fault: {message}")]
    RemoteFault {
        /// Description of the fault.
        message: String,
    },

    /// The backing store did not answer within the configured timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// The timeout that elapsed.
        after: Duration,
    },

    /// The configured backend cannot serve document operations.
    #[error("configuration mismatch: backend {backend:?} does not serve documents")]
    ConfigurationMismatch {
        /// Tag of the configured backend.
        backend: String,
    },
}

impl StoreError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid payload error.
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayloadShape {
            reason: reason.into(),
        }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a remote fault error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteFault {
            message: message.into(),
        }
    }

    /// Creates a configuration mismatch error.
    pub fn configuration_mismatch(backend: impl Into<String>) -> Self {
        Self::ConfigurationMismatch {
            backend: backend.into(),
        }
    }

    /// Returns true if the request never left this process.
    ///
    /// Retrying a local failure never helps.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidPath { .. }
                | StoreError::InvalidPayloadShape { .. }
                | StoreError::InvalidQuery { .. }
                | StoreError::ConfigurationMismatch { .. }
        )
    }

    /// Returns true if the store was contacted and failed.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            StoreError::RemoteFault { .. } | StoreError::Timeout { .. }
        )
    }

    /// Returns true if retrying the same operation might succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_remote()
    }

    /// Returns true for the not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(StoreError::invalid_path("x", "bad").is_local());
        assert!(StoreError::invalid_payload("empty").is_local());
        assert!(StoreError::configuration_mismatch("disabled").is_local());
        assert!(StoreError::remote("503").is_remote());
        assert!(StoreError::Timeout {
            operation: "read",
            after: Duration::from_secs(1)
        }
        .is_retryable());
        assert!(!StoreError::not_found("/a/b").is_retryable());
        assert!(!StoreError::not_found("/a/b").is_local());
    }

    #[test]
    fn error_display() {
        let err = StoreError::invalid_path("A/b", "must begin with '/'");
        let msg = err.to_string();
        assert!(msg.contains("A/b"));
        assert!(msg.contains("must begin"));
    }
}
