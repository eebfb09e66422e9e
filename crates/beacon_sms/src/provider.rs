//! Messaging provider abstraction.

use crate::error::{SmsError, SmsResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A message ready to hand to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Sender address (a provider-owned phone number).
    pub from: String,
    /// Recipient phone number.
    pub to: String,
    /// Message text.
    pub body: String,
}

impl OutboundMessage {
    /// Creates a message.
    pub fn new(from: impl Into<String>, to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            body: body.into(),
        }
    }

    /// Rejects messages no provider would accept.
    pub fn validate(&self) -> SmsResult<()> {
        if self.to.trim().is_empty() {
            return Err(SmsError::InvalidRequest("recipient is empty".into()));
        }
        if self.from.trim().is_empty() {
            return Err(SmsError::InvalidRequest("sender is empty".into()));
        }
        if self.body.is_empty() {
            return Err(SmsError::InvalidRequest("body is empty".into()));
        }
        Ok(())
    }
}

/// What the provider returned for a created message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    /// Provider-assigned message identifier.
    pub sid: Option<String>,
    /// Provider-reported status (`queued`, `sent`, ...).
    pub status: Option<String>,
}

impl MessageReceipt {
    /// Creates a receipt carrying a confirmation identifier.
    pub fn confirmed(sid: impl Into<String>) -> Self {
        Self {
            sid: Some(sid.into()),
            status: None,
        }
    }

    /// Returns the confirmation identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SmsError::MissingConfirmation`] when the provider did not
    /// assign one.
    pub fn confirmation_id(&self) -> SmsResult<&str> {
        match self.sid.as_deref() {
            Some(sid) if !sid.trim().is_empty() => Ok(sid),
            _ => Err(SmsError::MissingConfirmation),
        }
    }
}

/// An external SMS-sending service.
///
/// Implementations must be `Send + Sync`; one provider handle serves all
/// requests.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Short name of the provider, used in logs.
    fn provider_tag(&self) -> &'static str;

    /// Asks the provider to create (send) a message.
    async fn create_message(&self, message: &OutboundMessage) -> SmsResult<MessageReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_message() {
        assert!(OutboundMessage::new("+1555", "+1666", "hi").validate().is_ok());
        assert!(OutboundMessage::new("+1555", " ", "hi").validate().is_err());
        assert!(OutboundMessage::new("", "+1666", "hi").validate().is_err());
        assert!(OutboundMessage::new("+1555", "+1666", "").validate().is_err());
    }

    #[test]
    fn confirmation_id() {
        assert_eq!(
            MessageReceipt::confirmed("SM123").confirmation_id().unwrap(),
            "SM123"
        );
        assert_eq!(
            MessageReceipt::default().confirmation_id(),
            Err(SmsError::MissingConfirmation)
        );
        assert!(MessageReceipt::confirmed("").confirmation_id().is_err());
    }
}
