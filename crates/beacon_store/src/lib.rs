//! # Beacon Store
//!
//! Path-addressed access layer over a hierarchical document database.
//!
//! This crate provides:
//! - Path validation for document and collection paths
//! - A [`DocumentStore`] client with write/read/exists/delete/copy/query
//! - Single-filter query construction
//! - Backends: Cloud Firestore (REST), in-memory, and disabled
//!
//! ## Paths
//!
//! ```text
//! /Collection/Document/SubCollection/SubDocument   document path
//! /Collection/Document/SubCollection/              collection path
//! ```
//!
//! ## Error model
//!
//! Every operation returns a [`StoreResult`]. Local validation failures
//! ([`StoreError::is_local`]) are distinguished from remote faults
//! ([`StoreError::is_remote`]) so callers know whether a retry can help.
//!
//! ## Example
//!
//! ```rust
//! use beacon_store::{DocumentStore, InMemoryBackend, StoreError};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let store = DocumentStore::new(InMemoryBackend::new());
//! store.write_value("/Users/alice", json!({"email": "a@x.io"})).await.unwrap();
//! store.write_value("/Users/alice", json!({"role": "admin"})).await.unwrap();
//!
//! let alice = store.read("/Users/alice").await.unwrap();
//! assert_eq!(alice.len(), 2);
//!
//! let admins = store
//!     .query_by_fields("/Users/", &[json!("role"), json!("=="), json!("admin")])
//!     .await
//!     .unwrap();
//! assert!(admins.contains_key("alice"));
//!
//! assert!(matches!(store.read("Users/alice").await, Err(StoreError::InvalidPath { .. })));
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod backend;
mod client;
mod disabled;
mod document;
mod error;
pub mod firestore;
mod memory;
pub mod path;
mod query;

pub use backend::DocumentBackend;
pub use client::{DocumentStore, QueryResults, DEFAULT_TIMEOUT};
pub use disabled::DisabledBackend;
pub use document::{document_from_value, leaf_paths, merge_into, Document, FieldPath};
pub use error::{StoreError, StoreResult};
pub use firestore::{FirestoreBackend, FirestoreConfig};
pub use memory::InMemoryBackend;
pub use path::{validate_collection_path, validate_document_path, CollectionPath, DocumentPath};
pub use query::{FieldFilter, FilterOp, Query, QUERY_SPEC_LEN};
