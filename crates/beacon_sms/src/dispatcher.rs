//! Boolean-result message dispatch.

use crate::error::{SmsError, SmsResult};
use crate::provider::{MessageReceipt, OutboundMessage, SmsProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default bound on a provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends single messages from a fixed sender address.
///
/// [`Dispatcher::dispatch`] never fails past this boundary: every provider
/// fault becomes `false` plus a logged diagnostic. [`Dispatcher::send`]
/// exposes the typed result for callers that want it.
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn SmsProvider>,
    from: String,
    timeout: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher sending from `from`.
    pub fn new(provider: impl SmsProvider + 'static, from: impl Into<String>) -> Self {
        Self::from_arc(Arc::new(provider), from)
    }

    /// Creates a dispatcher over a shared provider.
    pub fn from_arc(provider: Arc<dyn SmsProvider>, from: impl Into<String>) -> Self {
        Self {
            provider,
            from: from.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bound on a provider call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the sender address.
    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Sends a message and returns the provider's confirmation id.
    pub async fn send(&self, body: &str, to: &str) -> SmsResult<String> {
        let message = OutboundMessage::new(self.from.clone(), to, body);
        message.validate()?;

        let receipt = tokio::time::timeout(self.timeout, self.provider.create_message(&message))
            .await
            .map_err(|_| SmsError::Timeout(self.timeout))??;
        receipt.confirmation_id().map(str::to_string)
    }

    /// Sends a message; true only if the provider confirmed creation.
    pub async fn dispatch(&self, body: &str, to: &str) -> bool {
        match self.send(body, to).await {
            Ok(sid) => {
                info!(to = %to, sid = %sid, provider = self.provider.provider_tag(), "SMS sent");
                true
            }
            Err(e) => {
                warn!(to = %to, error = %e, provider = self.provider.provider_tag(), "SMS dispatch failed");
                false
            }
        }
    }

    /// Checks a message created elsewhere; no provider call is made.
    ///
    /// True only if the receipt carries a confirmation identifier.
    pub fn dispatch_created(&self, receipt: &MessageReceipt) -> bool {
        match receipt.confirmation_id() {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "pre-built message was not confirmed");
                false
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("provider", &self.provider.provider_tag())
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}
