//! Document values and field paths.

use crate::error::{StoreError, StoreResult};
use serde_json::{Map, Value};
use std::fmt;

/// A document body: field names mapped to JSON-compatible values.
pub type Document = Map<String, Value>;

/// Converts a JSON value into a document.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPayloadShape`] unless the value is a
/// non-empty object.
pub fn document_from_value(value: Value) -> StoreResult<Document> {
    match value {
        Value::Object(map) if !map.is_empty() => Ok(map),
        Value::Object(_) => Err(StoreError::invalid_payload("document has no fields")),
        other => Err(StoreError::invalid_payload(format!(
            "document must be a mapping, got {}",
            kind_of(&other)
        ))),
    }
}

/// Merges `patch` into `base`.
///
/// Nested mappings are merged recursively; every other value in `patch`
/// replaces the value in `base`.
pub fn merge_into(base: &mut Document, patch: &Document) {
    for (key, patch_value) in patch {
        match (base.get_mut(key), patch_value) {
            (Some(Value::Object(base_map)), Value::Object(patch_map)) => {
                merge_into(base_map, patch_map);
            }
            _ => {
                base.insert(key.clone(), patch_value.clone());
            }
        }
    }
}

/// Returns the path of every leaf written by a merge of `fields`.
///
/// Non-empty nested mappings are descended into; anything else, including
/// an empty mapping, is a leaf.
pub fn leaf_paths(fields: &Document) -> Vec<FieldPath> {
    let mut out = Vec::new();
    collect_leaves(fields, &mut Vec::new(), &mut out);
    out
}

fn collect_leaves(fields: &Document, prefix: &mut Vec<String>, out: &mut Vec<FieldPath>) {
    for (key, value) in fields {
        prefix.push(key.clone());
        match value {
            Value::Object(nested) if !nested.is_empty() => collect_leaves(nested, prefix, out),
            _ => out.push(FieldPath(prefix.clone())),
        }
        prefix.pop();
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// A dotted path to a (possibly nested) field.
///
/// Segments are separated by `.`. A segment containing characters other
/// than ASCII letters, digits and `_` (or starting with a digit) is written
/// between backticks, with `` ` `` and `\` escaped by a backslash:
/// `` clients.`c-1`.`last ip` ``.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Creates a field path from raw segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses a dotted, optionally backtick-quoted, field path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] for empty segments or an
    /// unterminated quote.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars();
        let mut quoted_segment = false;

        while let Some(c) = chars.next() {
            match c {
                '`' if current.is_empty() && !quoted_segment => {
                    loop {
                        match chars.next() {
                            Some('`') => break,
                            Some('\\') => match chars.next() {
                                Some(escaped) => current.push(escaped),
                                None => {
                                    return Err(StoreError::invalid_query(format!(
                                        "unterminated escape in field path {raw:?}"
                                    )))
                                }
                            },
                            Some(other) => current.push(other),
                            None => {
                                return Err(StoreError::invalid_query(format!(
                                    "unterminated quote in field path {raw:?}"
                                )))
                            }
                        }
                    }
                    quoted_segment = true;
                }
                '.' => {
                    if current.is_empty() {
                        return Err(StoreError::invalid_query(format!(
                            "empty segment in field path {raw:?}"
                        )));
                    }
                    segments.push(std::mem::take(&mut current));
                    quoted_segment = false;
                }
                _ if quoted_segment => {
                    return Err(StoreError::invalid_query(format!(
                        "unexpected {c:?} after quoted segment in field path {raw:?}"
                    )));
                }
                _ => current.push(c),
            }
        }
        if current.is_empty() {
            return Err(StoreError::invalid_query(format!(
                "empty segment in field path {raw:?}"
            )));
        }
        segments.push(current);
        Ok(Self(segments))
    }

    /// Returns the raw segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Looks the field up in a document.
    pub fn lookup<'a>(&self, document: &'a Document) -> Option<&'a Value> {
        let (first, rest) = self.0.split_first()?;
        let mut value = document.get(first)?;
        for segment in rest {
            value = value.as_object()?.get(segment)?;
        }
        Some(value)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if is_simple_segment(segment) {
                f.write_str(segment)?;
            } else {
                f.write_str("`")?;
                for c in segment.chars() {
                    if c == '`' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("`")?;
            }
        }
        Ok(())
    }
}

fn is_simple_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
