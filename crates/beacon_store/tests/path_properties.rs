//! Property tests for path validation and document merging.

use beacon_store::{
    merge_into, validate_collection_path, validate_document_path, CollectionPath, DocumentPath,
    StoreError,
};
use beacon_testkit::generators::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn document_path_split_rejoins((collection, name) in document_path_strategy()) {
        let path = format!("/{collection}/{name}");
        let (c, n) = validate_document_path(&path).unwrap();
        prop_assert_eq!(format!("/{c}/{n}"), path.clone());
        prop_assert_eq!(DocumentPath::parse(&path).unwrap().to_string(), path);
    }

    #[test]
    fn collection_path_strips_delimiters(collection in collection_path_strategy()) {
        let path = format!("/{collection}/");
        prop_assert_eq!(validate_collection_path(&path).unwrap(), collection);
        prop_assert_eq!(CollectionPath::parse(&path).unwrap().to_string(), path);
    }

    #[test]
    fn document_and_collection_paths_are_disjoint(collection in collection_path_strategy()) {
        // A collection path with its trailing delimiter dropped is never a document.
        let path = format!("/{collection}");
        prop_assert!(validate_document_path(&path).is_err());
    }

    #[test]
    fn malformed_paths_are_rejected(path in malformed_document_path_strategy()) {
        let rejected = matches!(
            validate_document_path(&path),
            Err(StoreError::InvalidPath { .. })
        );
        prop_assert!(rejected, "{:?} was accepted", path);
    }

    #[test]
    fn merge_keeps_every_patch_field(base in document_strategy(), patch in document_strategy()) {
        let mut merged = base.clone();
        merge_into(&mut merged, &patch);
        for (key, value) in &patch {
            match (base.get(key), value) {
                (Some(serde_json::Value::Object(_)), serde_json::Value::Object(inner)) => {
                    let merged_inner = merged[key].as_object().unwrap();
                    for (k, v) in inner {
                        prop_assert_eq!(&merged_inner[k], v);
                    }
                }
                _ => prop_assert_eq!(&merged[key], value),
            }
        }
        for key in base.keys() {
            prop_assert!(merged.contains_key(key));
        }
    }
}
