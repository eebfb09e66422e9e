//! In-memory document backend.

use crate::backend::DocumentBackend;
use crate::document::{merge_into, Document};
use crate::error::StoreResult;
use crate::path::DocumentPath;
use crate::query::Query;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory document backend.
///
/// Documents are keyed by their relative path (`A/B/C/D`). This backend
/// is suitable for:
/// - Unit and integration tests
/// - Running the server locally without cloud credentials
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across requests.
///
/// # Example
///
/// ```rust
/// use beacon_store::{DocumentStore, InMemoryBackend};
/// use serde_json::json;
///
/// # tokio_test_block(async {
/// let store = DocumentStore::new(InMemoryBackend::new());
/// let fields = json!({"a": 1}).as_object().cloned().unwrap();
/// store.write("/Things/one", &fields).await.unwrap();
/// assert!(store.exists("/Things/one").await.unwrap());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    documents: RwLock<BTreeMap<String, Document>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the document stored under a relative path.
    ///
    /// Useful for asserting on what was written.
    #[must_use]
    pub fn snapshot(&self, relative_path: &str) -> Option<Document> {
        self.documents.read().get(relative_path).cloned()
    }

    /// Returns the number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Removes every document.
    pub fn clear(&self) {
        self.documents.write().clear();
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn merge_document(&self, path: &DocumentPath, fields: &Document) -> StoreResult<()> {
        let mut documents = self.documents.write();
        let entry = documents.entry(path.relative()).or_default();
        merge_into(entry, fields);
        Ok(())
    }

    async fn get_document(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        Ok(self.documents.read().get(&path.relative()).cloned())
    }

    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()> {
        self.documents.write().remove(&path.relative());
        Ok(())
    }

    async fn run_query(&self, query: &Query) -> StoreResult<Vec<(String, Document)>> {
        let prefix = format!("{}/", query.collection().as_str());
        let documents = self.documents.read();
        Ok(documents
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, fields)| {
                let id = &key[prefix.len()..];
                // Direct children only; deeper keys live in subcollections.
                if id.contains('/') || !query.filter().matches(fields) {
                    return None;
                }
                Some((id.to_string(), fields.clone()))
            })
            .collect())
    }
}
