//! Server configuration.

use crate::error::{ConfigError, ConfigResult};
use beacon_sms::TwilioConfig;
use beacon_store::{validate_collection_path, FirestoreConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

/// Which document storage the audit log goes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// Cloud Firestore.
    #[default]
    Firestore,
    /// Process-local storage, lost on restart.
    Memory,
    /// No storage; audit calls only log a warning.
    Disabled,
}

impl DatabaseType {
    /// Returns the configuration spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseType::Firestore => "firestore",
            DatabaseType::Memory => "memory",
            DatabaseType::Disabled => "disabled",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the server.
///
/// Every field has a default, so an empty file is a valid (if useless)
/// configuration until [`ServerConfig::validate`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enables verbose diagnostics.
    pub debug_mode: bool,
    /// Marks a non-production deployment; SMS credentials become optional.
    pub test_mode: bool,
    /// Audit storage selection.
    pub database_type: DatabaseType,
    /// Root collection holding the audit documents.
    pub log_root: String,
    /// Bound on every store and provider call, in milliseconds.
    pub remote_timeout_ms: u64,
    /// Firestore connection settings.
    pub firestore: FirestoreConfig,
    /// Twilio account settings.
    pub twilio: TwilioConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug_mode: false,
            test_mode: false,
            database_type: DatabaseType::default(),
            log_root: "Clients".to_string(),
            remote_timeout_ms: 10_000,
            firestore: FirestoreConfig::default(),
            twilio: TwilioConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads a configuration file, picking the format from its extension.
    ///
    /// `.yml` and `.yaml` are read as YAML and `.json` as JSON, in any case.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "yml" | "yaml" => {
                let text = std::fs::read_to_string(path)?;
                Self::from_yaml(&text)
            }
            "json" => {
                let text = std::fs::read_to_string(path)?;
                Self::from_json(&text)
            }
            _ => Err(ConfigError::UnsupportedExtension(extension)),
        }
    }

    /// Parses a YAML document.
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        // serde_yaml rejects an empty document; treat it as all defaults.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a JSON document.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Sets the bind host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the bind port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets test mode.
    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Sets the audit storage selection.
    #[must_use]
    pub fn with_database_type(mut self, database_type: DatabaseType) -> Self {
        self.database_type = database_type;
        self
    }

    /// Sets the audit root collection.
    #[must_use]
    pub fn with_log_root(mut self, log_root: impl Into<String>) -> Self {
        self.log_root = log_root.into();
        self
    }

    /// Sets the remote call timeout.
    #[must_use]
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the Firestore settings.
    #[must_use]
    pub fn with_firestore(mut self, firestore: FirestoreConfig) -> Self {
        self.firestore = firestore;
        self
    }

    /// Sets the Twilio settings.
    #[must_use]
    pub fn with_twilio(mut self, twilio: TwilioConfig) -> Self {
        self.twilio = twilio;
        self
    }

    /// Returns the remote call timeout.
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Returns the server mode label shown at startup.
    pub fn mode_label(&self) -> &'static str {
        if self.test_mode {
            "TEST"
        } else {
            "PRODUCTION"
        }
    }

    /// Resolves `host:port` to a socket address.
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ConfigError::Invalid(format!("bad host {:?}: {e}", self.host)))?
            .next()
            .ok_or_else(|| ConfigError::Invalid(format!("host {:?} did not resolve", self.host)))
    }

    /// Checks that the settings can start a server.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".into()));
        }
        if self.remote_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "remote_timeout_ms must be non-zero".into(),
            ));
        }
        validate_collection_path(&format!("/{}/", self.log_root)).map_err(|_| {
            ConfigError::Invalid(format!(
                "log_root {:?} must be a single collection name",
                self.log_root
            ))
        })?;
        if self.database_type == DatabaseType::Firestore
            && self.firestore.project_id.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "firestore.project_id is required when database_type is firestore".into(),
            ));
        }
        if !self.test_mode && !self.twilio.is_complete() {
            return Err(ConfigError::Invalid(
                "twilio.account_sid, twilio.auth_token and twilio.from_phone are required".into(),
            ));
        }
        Ok(())
    }

    /// Returns a copy with every secret replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.firestore.access_token.is_some() {
            shown.firestore.access_token = Some(REDACTED.to_string());
        }
        if !shown.twilio.auth_token.is_empty() {
            shown.twilio.auth_token = REDACTED.to_string();
        }
        shown
    }
}

const REDACTED: &str = "<redacted>";

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ServerConfig {
        ServerConfig::default()
            .with_firestore(FirestoreConfig::new("demo-project"))
            .with_twilio(TwilioConfig::new("AC1", "token", "+15550000000"))
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_type, DatabaseType::Firestore);
        assert_eq!(config.log_root, "Clients");
        assert_eq!(config.remote_timeout(), Duration::from_secs(10));
        assert_eq!(config.mode_label(), "PRODUCTION");
    }

    #[test]
    fn yaml_overrides_defaults() {
        let config = ServerConfig::from_yaml(
            "port: 8080\ndatabase_type: memory\ntest_mode: true\ntwilio:\n  from_phone: '+1'\n",
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_type, DatabaseType::Memory);
        assert_eq!(config.twilio.from_phone, "+1");
        assert_eq!(config.twilio.base_url, beacon_sms::twilio::DEFAULT_BASE_URL);
        assert_eq!(config.host, "127.0.0.1");
        assert!(ServerConfig::from_yaml("").unwrap() == ServerConfig::default());
    }

    #[test]
    fn unknown_database_type_is_rejected() {
        assert!(matches!(
            ServerConfig::from_json(r#"{"database_type": "mongo"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn validation() {
        assert!(complete().validate().is_ok());
        assert!(complete().with_port(0).validate().is_err());
        assert!(complete().with_log_root("A/B").validate().is_err());
        assert!(complete()
            .with_remote_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(complete()
            .with_firestore(FirestoreConfig::default())
            .validate()
            .is_err());
        assert!(complete()
            .with_firestore(FirestoreConfig::default())
            .with_database_type(DatabaseType::Memory)
            .validate()
            .is_ok());

        let no_sms = complete().with_twilio(TwilioConfig::default());
        assert!(no_sms.validate().is_err());
        assert!(no_sms.with_test_mode(true).validate().is_ok());
    }

    #[test]
    fn socket_addr() {
        let addr = complete().with_port(5050).socket_addr().unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 5050)));
    }

    #[test]
    fn redacts_secrets() {
        let config = complete().with_firestore(
            FirestoreConfig::new("demo-project").with_access_token("ya29.secret"),
        );
        let shown = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("ya29.secret"));
        assert!(!shown.contains("\"token\""));
        assert!(shown.contains("AC1"));
    }
}
