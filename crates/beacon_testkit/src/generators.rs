//! Property-based test generators using proptest.
//!
//! Provides strategies for generating store paths and documents that
//! satisfy (or deliberately violate) the path rules.

use beacon_store::Document;
use proptest::prelude::*;
use serde_json::Value;

/// Strategy for generating a single valid path segment.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_][A-Za-z0-9_ -]{0,11}").expect("Invalid regex")
}

/// Strategy for generating `(collection, name)` pairs of valid document
/// paths, rendered together as `/collection/name`.
pub fn document_path_strategy() -> impl Strategy<Value = (String, String)> {
    (1usize..4)
        .prop_flat_map(|pairs| prop::collection::vec(segment_strategy(), pairs * 2))
        .prop_map(|mut segments| {
            let name = segments.pop().unwrap_or_default();
            (segments.join("/"), name)
        })
}

/// Strategy for generating valid collection paths without delimiters
/// (`A` or `A/B/C`).
pub fn collection_path_strategy() -> impl Strategy<Value = String> {
    (0usize..3)
        .prop_flat_map(|pairs| prop::collection::vec(segment_strategy(), pairs * 2 + 1))
        .prop_map(|segments| segments.join("/"))
}

/// Strategy for generating strings that are never valid document paths.
pub fn malformed_document_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Missing leading delimiter.
        document_path_strategy().prop_map(|(c, n)| format!("{c}/{n}")),
        // Trailing delimiter.
        document_path_strategy().prop_map(|(c, n)| format!("/{c}/{n}/")),
        // Addresses a collection.
        collection_path_strategy().prop_map(|c| format!("/{c}")),
        // Blank segment.
        document_path_strategy().prop_map(|(c, n)| format!("/{c}//{n}")),
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

/// Strategy for generating scalar JSON leaves.
pub fn leaf_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        prop::string::string_regex("[a-z0-9 ]{0,16}")
            .expect("Invalid regex")
            .prop_map(Value::String),
    ]
}

/// Strategy for generating non-empty documents up to two levels deep.
pub fn document_strategy() -> impl Strategy<Value = Document> {
    let key = || prop::string::string_regex("[a-z][a-z0-9_]{0,7}").expect("Invalid regex");
    let nested = prop::collection::btree_map(key(), leaf_value_strategy(), 1..4)
        .prop_map(|m| Value::Object(m.into_iter().collect()));
    let value = prop_oneof![3 => leaf_value_strategy(), 1 => nested];
    prop::collection::btree_map(key(), value, 1..6).prop_map(|m| m.into_iter().collect())
}
