//! Path-addressed document store client.

use crate::backend::DocumentBackend;
use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::path::{CollectionPath, DocumentPath};
use crate::query::Query;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default bound on every backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query results keyed by document id.
pub type QueryResults = BTreeMap<String, Document>;

/// Provides path-addressed CRUD and query operations on a document
/// backend.
///
/// The `DocumentStore` owns the backend handle exclusively; callers only
/// see paths and documents. Every operation validates its path first, so
/// a malformed path is reported as [`StoreError::InvalidPath`] without any
/// request being sent. Every backend call is bounded by a timeout that
/// surfaces as [`StoreError::Timeout`].
///
/// The store is cheap to clone and safe to share across concurrent
/// requests.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn DocumentBackend>,
    timeout: Duration,
}

impl DocumentStore {
    /// Creates a store over a backend with the default timeout.
    pub fn new(backend: impl DocumentBackend + 'static) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Creates a store over a shared backend.
    pub fn from_arc(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bound on every backend call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the backend tag (`firestore`, `memory`, `disabled`, ...).
    pub fn backend_tag(&self) -> &'static str {
        self.backend.backend_tag()
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "document store call timed out");
                Err(StoreError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }

    /// Merge-writes `fields` into the document at `path`.
    ///
    /// Existing fields not named in `fields` are kept; nested mappings are
    /// merged.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidPayloadShape`] if `fields` is empty
    /// - [`StoreError::InvalidPath`] if `path` is not a document path
    /// - [`StoreError::RemoteFault`] / [`StoreError::Timeout`] if the store
    ///   fails
    pub async fn write(&self, path: &str, fields: &Document) -> StoreResult<()> {
        if fields.is_empty() {
            error!(path = %path, "refusing to write a document with no fields");
            return Err(StoreError::invalid_payload("document has no fields"));
        }
        let doc_path = DocumentPath::parse(path)?;
        self.bounded("write", self.backend.merge_document(&doc_path, fields))
            .await
            .inspect_err(|e| error!(path = %path, error = %e, "document write failed"))
    }

    /// Merge-writes a JSON value, which must be a non-empty mapping.
    pub async fn write_value(&self, path: &str, value: Value) -> StoreResult<()> {
        let fields = crate::document::document_from_value(value)?;
        self.write(path, &fields).await
    }

    /// Reads the document at `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no document exists there
    /// - [`StoreError::InvalidPath`] if `path` is not a document path
    /// - [`StoreError::RemoteFault`] / [`StoreError::Timeout`] if the store
    ///   fails
    pub async fn read(&self, path: &str) -> StoreResult<Document> {
        let doc_path = DocumentPath::parse(path)?;
        match self
            .bounded("read", self.backend.get_document(&doc_path))
            .await
        {
            Ok(Some(fields)) => Ok(fields),
            Ok(None) => {
                debug!(path = %path, "document does not exist");
                Err(StoreError::not_found(path))
            }
            Err(e) => {
                error!(path = %path, error = %e, "document read failed");
                Err(e)
            }
        }
    }

    /// Checks whether a document exists at `path`.
    ///
    /// Not-found is `Ok(false)`; every other failure propagates.
    pub async fn exists(&self, path: &str) -> StoreResult<bool> {
        match self.read(path).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Deletes the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there was nothing to delete.
    pub async fn delete(&self, path: &str) -> StoreResult<()> {
        if !self.exists(path).await? {
            return Err(StoreError::not_found(path));
        }
        let doc_path = DocumentPath::parse(path)?;
        self.bounded("delete", self.backend.delete_document(&doc_path))
            .await
            .inspect_err(|e| error!(path = %path, error = %e, "document delete failed"))
    }

    /// Copies the fields of `from_path` into `to_path`.
    ///
    /// The destination is merge-written, so fields it already has and the
    /// source lacks survive. The copy is not transactional: if the read
    /// succeeds and the write fails, nothing is rolled back and the whole
    /// copy should be retried.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the source does not exist,
    /// [`StoreError::InvalidPayloadShape`] if it has no fields, or any
    /// error from the read or the write.
    pub async fn copy(&self, from_path: &str, to_path: &str) -> StoreResult<()> {
        DocumentPath::parse(to_path)?;
        let fields = self
            .read(from_path)
            .await
            .inspect_err(|e| error!(from = %from_path, error = %e, "copy source unreadable"))?;
        if fields.is_empty() {
            return Err(StoreError::invalid_payload(format!(
                "copy source {from_path} has no fields"
            )));
        }
        self.write(to_path, &fields).await
    }

    /// Runs a `(field, operator, value)` query against a collection.
    ///
    /// Returns matching documents keyed by id; an empty map means nothing
    /// matched.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidPath`] if `collection_path` is not a
    ///   collection path
    /// - [`StoreError::InvalidQuery`] if the specification is malformed
    /// - [`StoreError::RemoteFault`] / [`StoreError::Timeout`] if the store
    ///   fails
    pub async fn query_by_fields(
        &self,
        collection_path: &str,
        spec: &[Value],
    ) -> StoreResult<QueryResults> {
        let collection = CollectionPath::parse(collection_path)?;
        let query = Query::from_spec(collection, spec)?;
        self.query(&query).await
    }

    /// Runs a prepared query.
    pub async fn query(&self, query: &Query) -> StoreResult<QueryResults> {
        let rows = self
            .bounded("query", self.backend.run_query(query))
            .await
            .inspect_err(|e| {
                error!(collection = %query.collection(), error = %e, "document query failed")
            })?;

        let mut results = QueryResults::new();
        for (id, fields) in rows {
            if results.contains_key(&id) {
                warn!(
                    collection = %query.collection(),
                    id = %id,
                    "duplicate document id in query results; keeping the later one"
                );
            }
            results.insert(id, fields);
        }
        Ok(results)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("backend", &self.backend.backend_tag())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disabled::DisabledBackend;
    use crate::memory::InMemoryBackend;
    use crate::path::DocumentPath;
    use async_trait::async_trait;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn create_store() -> DocumentStore {
        DocumentStore::new(InMemoryBackend::new())
    }

    /// Backend that never answers.
    struct StalledBackend;

    #[async_trait]
    impl DocumentBackend for StalledBackend {
        fn backend_tag(&self) -> &'static str {
            "stalled"
        }
        async fn merge_document(&self, _: &DocumentPath, _: &Document) -> StoreResult<()> {
            std::future::pending().await
        }
        async fn get_document(&self, _: &DocumentPath) -> StoreResult<Option<Document>> {
            std::future::pending().await
        }
        async fn delete_document(&self, _: &DocumentPath) -> StoreResult<()> {
            std::future::pending().await
        }
        async fn run_query(&self, _: &Query) -> StoreResult<Vec<(String, Document)>> {
            std::future::pending().await
        }
    }

    /// Backend whose query returns the same id twice.
    struct DuplicatingBackend;

    #[async_trait]
    impl DocumentBackend for DuplicatingBackend {
        fn backend_tag(&self) -> &'static str {
            "duplicating"
        }
        async fn merge_document(&self, _: &DocumentPath, _: &Document) -> StoreResult<()> {
            Ok(())
        }
        async fn get_document(&self, _: &DocumentPath) -> StoreResult<Option<Document>> {
            Ok(None)
        }
        async fn delete_document(&self, _: &DocumentPath) -> StoreResult<()> {
            Ok(())
        }
        async fn run_query(&self, _: &Query) -> StoreResult<Vec<(String, Document)>> {
            Ok(vec![
                ("x".to_string(), doc(json!({"v": 1}))),
                ("x".to_string(), doc(json!({"v": 2}))),
            ])
        }
    }

    #[tokio::test]
    async fn write_then_read() {
        let store = create_store();
        store.write("/T/d", &doc(json!({"a": 1}))).await.unwrap();
        let fields = store.read("/T/d").await.unwrap();
        assert_eq!(fields.get("a"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn writes_merge() {
        let store = create_store();
        store.write("/T/d", &doc(json!({"a": 1}))).await.unwrap();
        store.write("/T/d", &doc(json!({"b": 2}))).await.unwrap();
        let fields = store.read("/T/d").await.unwrap();
        assert_eq!(fields.get("a"), Some(&json!(1)));
        assert_eq!(fields.get("b"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn write_rejects_empty_payload_and_bad_path() {
        let store = create_store();
        let err = store.write("/T/d", &Document::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPayloadShape { .. }));

        let err = store.write("/T/", &doc(json!({"a": 1}))).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));
        assert!(err.is_local());

        let err = store.write_value("/T/d", json!([1])).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPayloadShape { .. }));
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let store = create_store();
        let err = store.read("/T/missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.exists("/T/missing").await.unwrap());
    }

    #[tokio::test]
    async fn exists_propagates_invalid_path() {
        let store = create_store();
        let err = store.exists("T/d").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn delete_existing_and_missing() {
        let store = create_store();
        store.write("/T/d", &doc(json!({"a": 1}))).await.unwrap();
        store.delete("/T/d").await.unwrap();
        assert!(!store.exists("/T/d").await.unwrap());

        let err = store.delete("/T/d").await.unwrap_err();
        assert_eq!(err, StoreError::not_found("/T/d"));
    }

    #[tokio::test]
    async fn copy_duplicates_fields() {
        let store = create_store();
        store
            .write("/T/src", &doc(json!({"a": 1, "n": {"x": true}})))
            .await
            .unwrap();
        store.copy("/T/src", "/Other/dst").await.unwrap();
        assert_eq!(
            store.read("/Other/dst").await.unwrap(),
            store.read("/T/src").await.unwrap()
        );
    }

    #[tokio::test]
    async fn copy_missing_source_fails() {
        let store = create_store();
        let err = store.copy("/T/none", "/T/dst").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.exists("/T/dst").await.unwrap());

        let err = store.copy("/T/none", "/T/").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn query_by_fields_returns_matches_by_id() {
        let store = create_store();
        store
            .write("/Users/a", &doc(json!({"email": "a@x.io"})))
            .await
            .unwrap();
        store
            .write("/Users/b", &doc(json!({"email": "b@x.io"})))
            .await
            .unwrap();

        let results = store
            .query_by_fields("/Users/", &[json!("email"), json!("=="), json!("b@x.io")])
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results["b"].get("email"), Some(&json!("b@x.io")));

        let none = store
            .query_by_fields("/Users/", &[json!("email"), json!("=="), json!("c@x.io")])
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn query_rejects_bad_inputs() {
        let store = create_store();
        let err = store
            .query_by_fields("/Users", &[json!("a"), json!("=="), json!("b")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));

        let err = store
            .query_by_fields(
                "/Users/",
                &[json!("a"), json!("=="), json!("b"), json!("c")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery { .. }));
    }

    #[tokio::test]
    async fn duplicate_ids_keep_last() {
        let store = DocumentStore::new(DuplicatingBackend);
        let results = store
            .query_by_fields("/X/", &[json!("v"), json!("!="), json!("0")])
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results["x"].get("v"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn stalled_backend_times_out() {
        let store =
            DocumentStore::new(StalledBackend).with_timeout(Duration::from_millis(20));
        let err = store.read("/T/d").await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout { operation: "read", .. }));
        assert!(err.is_retryable());

        let err = store.write("/T/d", &doc(json!({"a": 1}))).await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout { operation: "write", .. }));
    }

    #[tokio::test]
    async fn disabled_backend_reports_mismatch() {
        let store = DocumentStore::new(DisabledBackend::new("none"));
        let err = store.write("/T/d", &doc(json!({"a": 1}))).await.unwrap_err();
        assert!(matches!(err, StoreError::ConfigurationMismatch { .. }));
        assert_eq!(store.backend_tag(), "disabled");
    }
}
