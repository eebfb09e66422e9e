//! Best-effort audit records of pings and SMS sends.

use beacon_store::{DocumentStore, StoreError};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Document (under the log root) holding the latest ping per client.
pub const PING_LOG_DOCUMENT: &str = "Last Ping Log";

/// Document (under the log root) holding every SMS send per client.
pub const SMS_LOG_DOCUMENT: &str = "SMS Log";

/// Records client activity in the document store.
///
/// Both operations merge into a shared log document keyed by client id,
/// so concurrent clients never overwrite each other's entries. Failures
/// are logged and reported as `false`; they never reach the request that
/// triggered them.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    store: DocumentStore,
    log_root: String,
}

impl AuditLogger {
    /// Creates a logger writing under `/<log_root>/`.
    pub fn new(store: DocumentStore, log_root: impl Into<String>) -> Self {
        Self {
            store,
            log_root: log_root.into(),
        }
    }

    /// Returns the store the logger writes to.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Returns the path of the ping log document.
    pub fn ping_log_path(&self) -> String {
        format!("/{}/{PING_LOG_DOCUMENT}", self.log_root)
    }

    /// Returns the path of the SMS log document.
    pub fn sms_log_path(&self) -> String {
        format!("/{}/{SMS_LOG_DOCUMENT}", self.log_root)
    }

    /// Records the latest ping of a client.
    ///
    /// Returns true if the record was written.
    pub async fn log_ping(
        &self,
        timestamp: &str,
        client_id: &str,
        client_ip: &str,
        client_version: &str,
    ) -> bool {
        let event = ping_event(timestamp, client_id, client_ip, client_version);
        let path = self.ping_log_path();
        match self.store.write_value(&path, event).await {
            Ok(()) => {
                debug!(client_id = %client_id, path = %path, "ping recorded");
                true
            }
            Err(e) => {
                self.report(&e, &path, client_id);
                false
            }
        }
    }

    /// Records one SMS send attempt of a client.
    ///
    /// Returns true if the record was written.
    pub async fn log_sms_sent(
        &self,
        timestamp: &str,
        client_id: &str,
        message_contents: &str,
        to_phone: &str,
        success: bool,
    ) -> bool {
        let event = sms_event(timestamp, client_id, message_contents, to_phone, success);
        let path = self.sms_log_path();
        match self.store.write_value(&path, event).await {
            Ok(()) => {
                debug!(client_id = %client_id, path = %path, success, "SMS send recorded");
                true
            }
            Err(e) => {
                self.report(&e, &path, client_id);
                false
            }
        }
    }

    fn report(&self, error: &StoreError, path: &str, client_id: &str) {
        match error {
            StoreError::ConfigurationMismatch { backend } => warn!(
                database_type = %backend,
                client_id = %client_id,
                "audit logging skipped: configured database is not a document store"
            ),
            other => warn!(
                path = %path,
                client_id = %client_id,
                error = %other,
                "failed to write audit record"
            ),
        }
    }
}

/// Builds the merge payload recording a ping.
pub fn ping_event(timestamp: &str, client_id: &str, client_ip: &str, client_version: &str) -> Value {
    json!({
        "clients": {
            client_id: {
                "timestamp": timestamp,
                "last_ip": client_ip,
                "client_version": client_version,
            }
        }
    })
}

/// Builds the merge payload recording an SMS send.
pub fn sms_event(
    timestamp: &str,
    client_id: &str,
    message_contents: &str,
    to_phone: &str,
    success: bool,
) -> Value {
    json!({
        "clients": {
            client_id: {
                timestamp: {
                    "message_contents": message_contents,
                    "to_phone": to_phone,
                    "success": success,
                }
            }
        }
    })
}
