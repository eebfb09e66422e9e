//! Request body checks run before any side effect.

use serde_json::{Map, Value};
use thiserror::Error;

/// Why a request body was refused.
///
/// The `Display` form is the client-facing `Cause` string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The body is not a JSON object.
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// Required keys are absent.
    #[error("Missing required keys from request body: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// Required keys are present but null.
    #[error("Null values for required keys in request body: {}", .0.join(", "))]
    NullValues(Vec<String>),

    /// Required keys hold something other than a string.
    #[error("Required keys must be strings: {}", .0.join(", "))]
    NotStrings(Vec<String>),
}

/// Parses a raw request body as a JSON object.
pub fn parse_body(raw: &[u8]) -> Result<Map<String, Value>, ValidationFailure> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ValidationFailure::NotAnObject),
    }
}

/// Returns the string values of `keys`, in order.
///
/// Missing keys are reported first, then nulls, then non-strings; each
/// report lists every offending key.
pub fn require_strings<'a, const N: usize>(
    body: &'a Map<String, Value>,
    keys: [&str; N],
) -> Result<[&'a str; N], ValidationFailure> {
    let missing = offending(body, &keys, |v| v.is_none());
    if !missing.is_empty() {
        return Err(ValidationFailure::MissingKeys(missing));
    }
    let nulls = offending(body, &keys, |v| matches!(v, Some(Value::Null)));
    if !nulls.is_empty() {
        return Err(ValidationFailure::NullValues(nulls));
    }
    let non_strings = offending(body, &keys, |v| !matches!(v, Some(Value::String(_))));
    if !non_strings.is_empty() {
        return Err(ValidationFailure::NotStrings(non_strings));
    }

    Ok(keys.map(|k| body.get(k).and_then(Value::as_str).unwrap_or_default()))
}

fn offending(
    body: &Map<String, Value>,
    keys: &[&str],
    pred: impl Fn(Option<&Value>) -> bool,
) -> Vec<String> {
    keys.iter()
        .filter(|k| pred(body.get(**k)))
        .map(|k| k.to_string())
        .collect()
}
