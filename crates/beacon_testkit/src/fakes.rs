//! Fake backends and providers for failure-path tests.

use async_trait::async_trait;
use beacon_sms::{MessageReceipt, OutboundMessage, SmsError, SmsProvider, SmsResult};
use beacon_store::{
    Document, DocumentBackend, DocumentPath, InMemoryBackend, Query, StoreError, StoreResult,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// A backend whose every call fails with a remote fault.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    message: String,
}

impl FailingBackend {
    /// Creates a backend failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T>(&self) -> StoreResult<T> {
        Err(StoreError::remote(self.message.clone()))
    }
}

impl Default for FailingBackend {
    fn default() -> Self {
        Self::new("store unavailable")
    }
}

#[async_trait]
impl DocumentBackend for FailingBackend {
    fn backend_tag(&self) -> &'static str {
        "failing"
    }

    async fn merge_document(&self, _path: &DocumentPath, _fields: &Document) -> StoreResult<()> {
        self.fail()
    }

    async fn get_document(&self, _path: &DocumentPath) -> StoreResult<Option<Document>> {
        self.fail()
    }

    async fn delete_document(&self, _path: &DocumentPath) -> StoreResult<()> {
        self.fail()
    }

    async fn run_query(&self, _query: &Query) -> StoreResult<Vec<(String, Document)>> {
        self.fail()
    }
}

/// An in-memory backend that sleeps before every call.
#[derive(Debug)]
pub struct SlowBackend {
    inner: InMemoryBackend,
    delay: Duration,
}

impl SlowBackend {
    /// Creates a backend delaying each call by `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryBackend::new(),
            delay,
        }
    }
}

#[async_trait]
impl DocumentBackend for SlowBackend {
    fn backend_tag(&self) -> &'static str {
        "slow"
    }

    async fn merge_document(&self, path: &DocumentPath, fields: &Document) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.merge_document(path, fields).await
    }

    async fn get_document(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_document(path).await
    }

    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete_document(path).await
    }

    async fn run_query(&self, query: &Query) -> StoreResult<Vec<(String, Document)>> {
        tokio::time::sleep(self.delay).await;
        self.inner.run_query(query).await
    }
}

/// An SMS provider that records every message it is asked to send.
///
/// Succeeds with sequential `SM<n>` identifiers until told to fail.
#[derive(Debug, Default)]
pub struct RecordingSmsProvider {
    sent: Mutex<Vec<OutboundMessage>>,
    failing: AtomicBool,
    counter: AtomicUsize,
}

impl RecordingSmsProvider {
    /// Creates a provider that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that rejects every message.
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.set_failing(true);
        provider
    }

    /// Switches between accepting and rejecting messages.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns every message received so far, including rejected ones.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl SmsProvider for RecordingSmsProvider {
    fn provider_tag(&self) -> &'static str {
        "recording"
    }

    async fn create_message(&self, message: &OutboundMessage) -> SmsResult<MessageReceipt> {
        self.sent.lock().push(message.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(SmsError::Provider {
                status: 400,
                message: "rejected by test provider".into(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageReceipt {
            sid: Some(format!("SM{n}")),
            status: Some("queued".into()),
        })
    }
}
