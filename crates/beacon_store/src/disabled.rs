//! Backend used when document storage is switched off.

use crate::backend::DocumentBackend;
use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::path::DocumentPath;
use crate::query::Query;
use async_trait::async_trait;

/// A backend that refuses every operation.
///
/// Selected when the configured database type is not a document store.
/// Every call fails with [`StoreError::ConfigurationMismatch`] naming the
/// configured type, so callers can tell "storage is off" apart from
/// "storage failed".
#[derive(Debug, Clone)]
pub struct DisabledBackend {
    configured: String,
}

impl DisabledBackend {
    /// Creates a disabled backend for the given configured database type.
    pub fn new(configured: impl Into<String>) -> Self {
        Self {
            configured: configured.into(),
        }
    }

    fn refuse<T>(&self) -> StoreResult<T> {
        Err(StoreError::configuration_mismatch(self.configured.clone()))
    }
}

#[async_trait]
impl DocumentBackend for DisabledBackend {
    fn backend_tag(&self) -> &'static str {
        "disabled"
    }

    async fn merge_document(&self, _path: &DocumentPath, _fields: &Document) -> StoreResult<()> {
        self.refuse()
    }

    async fn get_document(&self, _path: &DocumentPath) -> StoreResult<Option<Document>> {
        self.refuse()
    }

    async fn delete_document(&self, _path: &DocumentPath) -> StoreResult<()> {
        self.refuse()
    }

    async fn run_query(&self, _query: &Query) -> StoreResult<Vec<(String, Document)>> {
        self.refuse()
    }
}
