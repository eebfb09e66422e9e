//! # Beacon Testkit
//!
//! Test utilities for Beacon.
//!
//! This crate provides:
//! - Store fixtures backed by a shared in-memory backend
//! - Fake backends and SMS providers that fail or stall on demand
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use beacon_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_store() {
//!     let fixture = TestStore::new();
//!     fixture.store.write_value("/Things/one", json!({"a": 1})).await.unwrap();
//!     assert!(fixture.document("Things/one").is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fakes;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fakes::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fakes::*;
pub use fixtures::*;
pub use generators::*;
