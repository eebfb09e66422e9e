//! Single-filter query construction.
//!
//! A query specification is a `(field, operator, value)` triple. Every
//! element is coerced to its string form before use, so the filter always
//! compares a field against a string value. Only one filter per query is
//! supported; there is no AND/OR composition.

use crate::document::{Document, FieldPath};
use crate::error::{StoreError, StoreResult};
use crate::path::CollectionPath;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Number of elements in a query specification.
pub const QUERY_SPEC_LEN: usize = 3;

/// Comparison operator of a field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `array-contains`
    ArrayContains,
}

impl FilterOp {
    /// Parses an operator symbol.
    pub fn parse(symbol: &str) -> StoreResult<Self> {
        Ok(match symbol.trim() {
            "==" => FilterOp::Equal,
            "!=" => FilterOp::NotEqual,
            "<" => FilterOp::LessThan,
            "<=" => FilterOp::LessThanOrEqual,
            ">" => FilterOp::GreaterThan,
            ">=" => FilterOp::GreaterThanOrEqual,
            "array-contains" => FilterOp::ArrayContains,
            other => {
                return Err(StoreError::invalid_query(format!(
                    "unsupported operator {other:?}"
                )))
            }
        })
    }

    /// Returns the operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOp::Equal => "==",
            FilterOp::NotEqual => "!=",
            FilterOp::LessThan => "<",
            FilterOp::LessThanOrEqual => "<=",
            FilterOp::GreaterThan => ">",
            FilterOp::GreaterThanOrEqual => ">=",
            FilterOp::ArrayContains => "array-contains",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single `field <op> value` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    field: FieldPath,
    op: FilterOp,
    value: String,
}

impl FieldFilter {
    /// Creates a filter.
    pub fn new(field: FieldPath, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    /// Returns the filtered field.
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    /// Returns the operator.
    pub fn op(&self) -> FilterOp {
        self.op
    }

    /// Returns the comparison value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Evaluates the filter against a document.
    ///
    /// Follows the store's typing rules: ordering operators only match
    /// string fields, missing and null fields never match.
    pub fn matches(&self, document: &Document) -> bool {
        let Some(actual) = self.field.lookup(document) else {
            return false;
        };
        let expected = self.value.as_str();
        match (self.op, actual) {
            (_, Value::Null) => false,
            (FilterOp::ArrayContains, Value::Array(items)) => {
                items.iter().any(|item| item.as_str() == Some(expected))
            }
            (FilterOp::ArrayContains, _) => false,
            (FilterOp::NotEqual, other) => other.as_str() != Some(expected),
            (op, Value::String(actual)) => {
                let actual = actual.as_str();
                match op {
                    FilterOp::Equal => actual == expected,
                    FilterOp::LessThan => actual < expected,
                    FilterOp::LessThanOrEqual => actual <= expected,
                    FilterOp::GreaterThan => actual > expected,
                    FilterOp::GreaterThanOrEqual => actual >= expected,
                    FilterOp::NotEqual | FilterOp::ArrayContains => false,
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.field, self.op, self.value)
    }
}

/// A filter bound to one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    collection: CollectionPath,
    filter: FieldFilter,
}

impl Query {
    /// Binds a filter to a collection.
    pub fn new(collection: CollectionPath, filter: FieldFilter) -> Self {
        Self { collection, filter }
    }

    /// Builds a query from a `(field, operator, value)` specification.
    ///
    /// Non-string elements are coerced with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] if the specification does not
    /// have exactly three elements, the operator is unknown, or the field
    /// path is malformed.
    pub fn from_spec(collection: CollectionPath, spec: &[Value]) -> StoreResult<Self> {
        if spec.len() > QUERY_SPEC_LEN {
            return Err(StoreError::invalid_query(format!(
                "query specification has {} elements, at most {QUERY_SPEC_LEN} allowed",
                spec.len()
            )));
        }
        if spec.len() < QUERY_SPEC_LEN {
            return Err(StoreError::invalid_query(format!(
                "query specification needs (field, operator, value), got {} elements",
                spec.len()
            )));
        }

        let coerced: Vec<String> = spec
            .iter()
            .enumerate()
            .map(|(position, element)| coerce(position, element))
            .collect();

        let field = FieldPath::parse(&coerced[0])?;
        let op = FilterOp::parse(&coerced[1])?;
        let filter = FieldFilter::new(field, op, coerced[2].clone());
        Ok(Self::new(collection, filter))
    }

    /// Returns the target collection.
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Returns the filter.
    pub fn filter(&self) -> &FieldFilter {
        &self.filter
    }
}

fn coerce(position: usize, element: &Value) -> String {
    match element {
        Value::String(s) => s.clone(),
        other => {
            warn!(
                position,
                element = %other,
                "query element is not a string; coercing to its string form"
            );
            other.to_string()
        }
    }
}
