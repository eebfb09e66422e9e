//! Conversion between JSON values and Firestore typed values.
//!
//! Firestore's REST API wraps every value in a single-key object naming
//! its type (`{"stringValue": "x"}`, `{"mapValue": {"fields": {...}}}`).

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use serde_json::{json, Map, Number, Value};

/// Encodes a document body as a Firestore `fields` object.
pub fn encode_fields(fields: &Document) -> StoreResult<Value> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), encode_value(value)?)))
        .collect::<StoreResult<Map<String, Value>>>()
        .map(Value::Object)
}

/// Encodes one JSON value as a Firestore typed value.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPayloadShape`] for integers above
/// `i64::MAX`; Firestore integers are signed 64-bit.
pub fn encode_value(value: &Value) -> StoreResult<Value> {
    Ok(match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None if n.is_u64() => {
                return Err(StoreError::invalid_payload(format!(
                    "integer {n} does not fit a signed 64-bit Firestore integer"
                )));
            }
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items
                .iter()
                .map(encode_value)
                .collect::<StoreResult<Vec<Value>>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map)? } }),
    })
}

/// Decodes a Firestore `fields` object into a document body.
///
/// A missing `fields` object is an empty document.
pub fn decode_fields(fields: Option<&Value>) -> StoreResult<Document> {
    let Some(fields) = fields else {
        return Ok(Document::new());
    };
    let map = fields
        .as_object()
        .ok_or_else(|| StoreError::remote("document fields are not an object"))?;
    map.iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Decodes one Firestore typed value.
pub fn decode_value(value: &Value) -> StoreResult<Value> {
    let typed = value
        .as_object()
        .and_then(|map| map.iter().next())
        .map(|(kind, inner)| (kind.as_str(), inner))
        .ok_or_else(|| StoreError::remote(format!("malformed typed value: {value}")))?;

    match typed {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", raw) => {
            let parsed = match raw {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| StoreError::remote(format!("malformed integerValue: {raw}")))
        }
        ("doubleValue", raw) => {
            let parsed = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            // NaN and infinities have no JSON form.
            Ok(parsed
                .and_then(Number::from_f64)
                .map_or(Value::Null, Value::Number))
        }
        ("stringValue" | "timestampValue" | "referenceValue" | "bytesValue", Value::String(s)) => {
            Ok(Value::String(s.clone()))
        }
        ("geoPointValue", Value::Object(point)) => {
            let mut out = Map::new();
            for key in ["latitude", "longitude"] {
                out.insert(key.to_string(), point.get(key).cloned().unwrap_or(json!(0.0)));
            }
            Ok(Value::Object(out))
        }
        ("arrayValue", Value::Object(array)) => match array.get("values") {
            Some(Value::Array(items)) => {
                Ok(Value::Array(items.iter().map(decode_value).collect::<StoreResult<_>>()?))
            }
            _ => Ok(Value::Array(Vec::new())),
        },
        ("mapValue", Value::Object(map)) => Ok(Value::Object(decode_fields(map.get("fields"))?)),
        (kind, _) => Err(StoreError::remote(format!(
            "unsupported Firestore value type {kind:?}"
        ))),
    }
}
