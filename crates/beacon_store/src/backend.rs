//! Document backend trait definition.

use crate::document::Document;
use crate::error::StoreResult;
use crate::path::DocumentPath;
use crate::query::Query;
use async_trait::async_trait;

/// A remote (or in-process) hierarchical document database.
///
/// Backends receive paths that have already been validated and payloads
/// that have already been shape-checked. They report every failure of the
/// store itself as [`crate::StoreError::RemoteFault`].
///
/// # Invariants
///
/// - `merge_document` unions the given fields into any existing document;
///   nested mappings are merged, other values replaced
/// - `get_document` returns `None` only when the document does not exist
/// - `run_query` returns each matching document of the collection once
/// - Backends must be `Send + Sync`; one handle serves concurrent requests
///
/// # Implementors
///
/// - [`crate::InMemoryBackend`] - For tests and local development
/// - [`crate::FirestoreBackend`] - Cloud Firestore over its REST API
/// - [`crate::DisabledBackend`] - Rejects everything with a
///   configuration mismatch
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Short name of the backend, used in logs and errors.
    fn backend_tag(&self) -> &'static str;

    /// Merge-writes `fields` into the document at `path`.
    ///
    /// Missing parent collections and documents are created implicitly.
    async fn merge_document(&self, path: &DocumentPath, fields: &Document) -> StoreResult<()>;

    /// Fetches the document at `path`.
    async fn get_document(&self, path: &DocumentPath) -> StoreResult<Option<Document>>;

    /// Deletes the document at `path`.
    ///
    /// Deleting an absent document is not an error at this level.
    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()>;

    /// Runs a single-filter query and returns `(document id, fields)` pairs.
    async fn run_query(&self, query: &Query) -> StoreResult<Vec<(String, Document)>>;
}
