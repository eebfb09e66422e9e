//! Path validation for slash-delimited store paths.
//!
//! Paths address the store hierarchy as alternating collection and
//! document segments:
//!
//! ```text
//! /Collection/Document/SubCollection/SubDocument
//! ```
//!
//! A **document path** begins with `/`, does not end with `/`, and has an
//! odd number of separators between its segments (an even number of
//! segments). A **collection path** begins and ends with `/` and has an
//! even number of separators between its segments (an odd number of
//! segments).
//!
//! Validation is purely syntactic; nothing here touches the store.

use crate::error::{StoreError, StoreResult};
use std::fmt;
use tracing::debug;

/// Path delimiter.
pub const SEPARATOR: char = '/';

/// A validated document path.
///
/// For `/A/B/C/D` the collection path is `A/B/C` and the document name is
/// `D`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: String,
    name: String,
}

impl DocumentPath {
    /// Parses and validates a document path.
    pub fn parse(path: &str) -> StoreResult<Self> {
        let (collection, name) = validate_document_path(path)?;
        Ok(Self { collection, name })
    }

    /// Returns the collection portion without delimiters (`A/B/C`).
    pub fn collection_path(&self) -> &str {
        &self.collection
    }

    /// Returns the final segment.
    pub fn document_name(&self) -> &str {
        &self.name
    }

    /// Returns the path without its leading delimiter (`A/B/C/D`).
    pub fn relative(&self) -> String {
        format!("{}{}{}", self.collection, SEPARATOR, self.name)
    }

    /// Returns the individual segments, collection segments first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.collection
            .split(SEPARATOR)
            .chain(std::iter::once(self.name.as_str()))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SEPARATOR, self.relative())
    }
}

/// A validated collection path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    path: String,
}

impl CollectionPath {
    /// Parses and validates a collection path.
    pub fn parse(path: &str) -> StoreResult<Self> {
        Ok(Self {
            path: validate_collection_path(path)?,
        })
    }

    /// Returns the path with both delimiters stripped (`A/B/C`).
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Returns the parent document of a subcollection, if any.
    ///
    /// `A/B/C` has parent `A/B`; a root collection `A` has none.
    pub fn parent_document(&self) -> Option<&str> {
        self.path.rsplit_once(SEPARATOR).map(|(parent, _)| parent)
    }

    /// Returns the final segment (the collection id).
    pub fn collection_id(&self) -> &str {
        self.path
            .rsplit_once(SEPARATOR)
            .map_or(self.path.as_str(), |(_, id)| id)
    }

    /// Returns the document path for `name` inside this collection.
    pub fn document(&self, name: &str) -> StoreResult<DocumentPath> {
        DocumentPath::parse(&format!("{SEPARATOR}{}{SEPARATOR}{name}", self.path))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SEPARATOR}{}{SEPARATOR}", self.path)
    }
}

/// Validates a document path and splits it at its last separator.
///
/// Returns `(collection_path, document_name)`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPath`] if the path is blank, does not
/// start with `/`, ends with `/`, contains a blank segment, or has an even
/// number of separators between segments (which addresses a collection).
pub fn validate_document_path(path: &str) -> StoreResult<(String, String)> {
    check_non_blank(path)?;
    if !path.starts_with(SEPARATOR) {
        return Err(reject(path, "document path must begin with '/'"));
    }
    if path.ends_with(SEPARATOR) {
        return Err(reject(path, "document path must not end with '/'"));
    }

    let body = &path[1..];
    check_segments(path, body)?;

    let separators = body.matches(SEPARATOR).count();
    if separators % 2 == 0 {
        return Err(reject(
            path,
            "path addresses a collection, not a document (even separator count)",
        ));
    }

    match body.rsplit_once(SEPARATOR) {
        Some((collection, name)) => Ok((collection.to_string(), name.to_string())),
        None => Err(reject(path, "document path has no collection segment")),
    }
}

/// Validates a collection path and strips its delimiters.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPath`] if the path is blank, is missing its
/// leading or trailing `/`, contains a blank segment, or has an odd number
/// of separators between segments (which addresses a document).
pub fn validate_collection_path(path: &str) -> StoreResult<String> {
    check_non_blank(path)?;
    if !path.starts_with(SEPARATOR) {
        return Err(reject(path, "collection path must begin with '/'"));
    }
    if !path.ends_with(SEPARATOR) || path.len() < 2 {
        return Err(reject(path, "collection path must end with '/'"));
    }

    let body = &path[1..path.len() - 1];
    check_segments(path, body)?;

    if body.matches(SEPARATOR).count() % 2 != 0 {
        return Err(reject(
            path,
            "path addresses a document, not a collection (odd separator count)",
        ));
    }
    Ok(body.to_string())
}

fn check_non_blank(path: &str) -> StoreResult<()> {
    if path.trim().is_empty() {
        return Err(reject(path, "path is empty"));
    }
    Ok(())
}

fn check_segments(path: &str, body: &str) -> StoreResult<()> {
    for segment in body.split(SEPARATOR) {
        if segment.trim().is_empty() {
            return Err(reject(path, "path contains an empty segment"));
        }
        if segment == "." || segment == ".." {
            return Err(reject(path, "path segments may not be '.' or '..'"));
        }
    }
    Ok(())
}

fn reject(path: &str, reason: &str) -> StoreError {
    debug!(path = %path, reason, "rejected store path");
    StoreError::invalid_path(path, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_last_separator() {
        let (collection, name) = validate_document_path("/A/B/C/D").unwrap();
        assert_eq!(collection, "A/B/C");
        assert_eq!(name, "D");
    }

    #[test]
    fn root_document() {
        let (collection, name) = validate_document_path("/Clients/Last Ping Log").unwrap();
        assert_eq!(collection, "Clients");
        assert_eq!(name, "Last Ping Log");
    }

    #[test]
    fn rejects_malformed_document_paths() {
        for path in [
            "", " ", "A/B", "/A/B/", "/A", "/A/B/C", "//B", "/A//C/D", "/A/ /C/D", "/A/..",
        ] {
            let err = validate_document_path(path).unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidPath { .. }),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn collection_paths() {
        assert_eq!(validate_collection_path("/A/").unwrap(), "A");
        assert_eq!(validate_collection_path("/A/B/C/").unwrap(), "A/B/C");
    }

    #[test]
    fn rejects_malformed_collection_paths() {
        for path in ["", "/", "A/", "/A", "/A/B/", "//", "/A//C/"] {
            assert!(
                validate_collection_path(path).is_err(),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn document_path_accessors() {
        let path = DocumentPath::parse("/Clients/SMS Log").unwrap();
        assert_eq!(path.collection_path(), "Clients");
        assert_eq!(path.document_name(), "SMS Log");
        assert_eq!(path.relative(), "Clients/SMS Log");
        assert_eq!(path.to_string(), "/Clients/SMS Log");
        assert_eq!(path.segments().collect::<Vec<_>>(), ["Clients", "SMS Log"]);
    }

    #[test]
    fn collection_path_accessors() {
        let root = CollectionPath::parse("/Users/").unwrap();
        assert_eq!(root.parent_document(), None);
        assert_eq!(root.collection_id(), "Users");

        let sub = CollectionPath::parse("/Users/alice/Devices/").unwrap();
        assert_eq!(sub.parent_document(), Some("Users/alice"));
        assert_eq!(sub.collection_id(), "Devices");
        assert_eq!(sub.to_string(), "/Users/alice/Devices/");

        let doc = sub.document("phone").unwrap();
        assert_eq!(doc.to_string(), "/Users/alice/Devices/phone");
    }
}
