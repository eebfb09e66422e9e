//! Twilio Programmable Messaging provider.

use crate::error::{SmsError, SmsResult};
use crate::provider::{MessageReceipt, OutboundMessage, SmsProvider};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Twilio REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Twilio account settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwilioConfig {
    /// Account SID (`AC...`).
    pub account_sid: String,
    /// Auth token paired with the account SID.
    pub auth_token: String,
    /// Twilio phone number messages are sent from.
    pub from_phone: String,
    /// REST endpoint.
    pub base_url: String,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_phone: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl TwilioConfig {
    /// Creates a configuration with the default endpoint.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_phone: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_phone: from_phone.into(),
            ..Self::default()
        }
    }

    /// Sets the REST endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns true if every credential is present.
    pub fn is_complete(&self) -> bool {
        !self.account_sid.trim().is_empty()
            && !self.auth_token.trim().is_empty()
            && !self.from_phone.trim().is_empty()
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_phone", &self.from_phone)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Sends messages through the Twilio REST API.
#[derive(Debug, Clone)]
pub struct TwilioProvider {
    config: TwilioConfig,
    client: Client,
}

impl TwilioProvider {
    /// Creates a provider whose HTTP client gives up after `timeout`.
    pub fn new(config: TwilioConfig, timeout: Duration) -> SmsResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SmsError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn messages_url(&self) -> SmsResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| SmsError::InvalidRequest(format!("bad base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SmsError::InvalidRequest("base_url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["Accounts", self.config.account_sid.as_str(), "Messages.json"]);
        Ok(url)
    }
}

/// Extracts a receipt from a successful Messages API response.
pub fn parse_receipt(body: &Value) -> MessageReceipt {
    MessageReceipt {
        sid: body.get("sid").and_then(Value::as_str).map(str::to_string),
        status: body.get("status").and_then(Value::as_str).map(str::to_string),
    }
}

/// Extracts the error message from a failed Messages API response.
pub fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(256).collect())
}

#[async_trait]
impl SmsProvider for TwilioProvider {
    fn provider_tag(&self) -> &'static str {
        "twilio"
    }

    async fn create_message(&self, message: &OutboundMessage) -> SmsResult<MessageReceipt> {
        let url = self.messages_url()?;
        let form = [
            ("To", message.to.as_str()),
            ("From", message.from.as_str()),
            ("Body", message.body.as_str()),
        ];
        debug!(to = %message.to, "creating twilio message");

        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SmsError::Transport(format!("request timed out: {e}"))
                } else {
                    SmsError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SmsError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = parse_error_message(&text);
            warn!(status = %status, error = %message, "twilio rejected message");
            return Err(SmsError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| SmsError::Transport(format!("malformed response: {e}")))?;
        Ok(parse_receipt(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_url() {
        let provider = TwilioProvider::new(
            TwilioConfig::new("AC123", "token", "+15550000000"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            provider.messages_url().unwrap().as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn receipt_from_response() {
        let receipt = parse_receipt(&json!({"sid": "SM42", "status": "queued"}));
        assert_eq!(receipt.confirmation_id().unwrap(), "SM42");
        assert_eq!(receipt.status.as_deref(), Some("queued"));
        assert!(parse_receipt(&json!({})).confirmation_id().is_err());
    }

    #[test]
    fn error_message_from_response() {
        let body = r#"{"code": 21211, "message": "Invalid 'To' Phone Number", "status": 400}"#;
        assert_eq!(parse_error_message(body), "Invalid 'To' Phone Number");
        assert_eq!(parse_error_message("gateway down"), "gateway down");
    }

    #[test]
    fn config_debug_redacts_token() {
        let config = TwilioConfig::new("AC1", "secret-token", "+1");
        let shown = format!("{config:?}");
        assert!(!shown.contains("secret-token"));
        assert!(config.is_complete());
        assert!(!TwilioConfig::default().is_complete());
    }
}
