//! Application wiring and the serve loop.

use crate::audit::AuditLogger;
use crate::config::{DatabaseType, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::handlers::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use beacon_sms::{Dispatcher, TwilioProvider};
use beacon_store::{
    DisabledBackend, DocumentBackend, DocumentStore, FirestoreBackend, InMemoryBackend,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// A fully wired server: one store, one dispatcher, one audit logger.
#[derive(Debug, Clone)]
pub struct App {
    state: AppState,
}

impl App {
    /// Builds the application from configuration.
    ///
    /// The configuration is validated first; the storage backend is chosen
    /// by `database_type`.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let timeout = config.remote_timeout();

        let backend: Arc<dyn DocumentBackend> = match config.database_type {
            DatabaseType::Firestore => {
                Arc::new(FirestoreBackend::new(config.firestore.clone(), timeout)?)
            }
            DatabaseType::Memory => Arc::new(InMemoryBackend::new()),
            DatabaseType::Disabled => {
                Arc::new(DisabledBackend::new(config.database_type.as_str()))
            }
        };
        let store = DocumentStore::from_arc(backend).with_timeout(timeout);

        let provider = TwilioProvider::new(config.twilio.clone(), timeout)?;
        let dispatcher =
            Dispatcher::new(provider, config.twilio.from_phone.clone()).with_timeout(timeout);

        info!(
            database_type = %config.database_type,
            log_root = %config.log_root,
            timeout = ?timeout,
            "application wired"
        );
        Ok(Self::from_parts(store, dispatcher, config.log_root.clone()))
    }

    /// Builds the application from ready-made parts.
    pub fn from_parts(
        store: DocumentStore,
        dispatcher: Dispatcher,
        log_root: impl Into<String>,
    ) -> Self {
        Self {
            state: AppState {
                audit: Arc::new(AuditLogger::new(store, log_root)),
                dispatcher: Arc::new(dispatcher),
            },
        }
    }

    /// Returns the shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/healthz", get(handlers::healthz))
            .route("/api/ping", post(handlers::ping))
            .route("/api/send_test_message", post(handlers::send_test_message))
            .with_state(self.state.clone())
    }

    /// Serves on `addr` until `shutdown` resolves.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        info!(addr = %listener.local_addr()?, "listening");

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        info!("server stopped");
        Ok(())
    }
}
