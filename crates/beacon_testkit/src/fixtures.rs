//! Test fixtures and store helpers.

use beacon_store::{Document, DocumentStore, InMemoryBackend};
use serde_json::Value;
use std::sync::Arc;

/// A document store over an in-memory backend the test can inspect.
pub struct TestStore {
    /// The store client under test.
    pub store: DocumentStore,
    /// The backend behind `store`, shared for assertions.
    pub backend: Arc<InMemoryBackend>,
}

impl TestStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let store = DocumentStore::from_arc(backend.clone());
        Self { store, backend }
    }

    /// Returns the stored document at a relative path (`A/B`).
    pub fn document(&self, relative_path: &str) -> Option<Document> {
        self.backend.snapshot(relative_path)
    }

    /// Returns the value at a dotted field path of a stored document.
    pub fn field(&self, relative_path: &str, dotted: &str) -> Option<Value> {
        let document = self.document(relative_path)?;
        let mut parts = dotted.split('.');
        let mut current = document.get(parts.next()?)?.clone();
        for part in parts {
            current = current.get(part)?.clone();
        }
        Some(current)
    }

    /// Writes each `(path, value)` pair, panicking on failure.
    pub async fn seed<I>(&self, documents: I)
    where
        I: IntoIterator<Item = (&'static str, Value)>,
    {
        for (path, value) in documents {
            self.store
                .write_value(path, value)
                .await
                .unwrap_or_else(|e| panic!("failed to seed {path}: {e}"));
        }
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a JSON object literal into a [`Document`].
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
