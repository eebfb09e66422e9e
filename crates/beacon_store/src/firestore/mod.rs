//! Cloud Firestore backend over the REST API.
//!
//! Operations map onto Firestore v1 endpoints:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | merge-write | `PATCH documents/{path}?updateMask.fieldPaths=...` |
//! | read | `GET documents/{path}` (404 means absent) |
//! | delete | `DELETE documents/{path}` |
//! | query | `POST documents/{parent}:runQuery` |
//!
//! A merge-write sends every leaf field path of the payload as the update
//! mask, so only those fields are touched and everything else in the
//! stored document survives.

mod value;

pub use value::{decode_fields, decode_value, encode_fields, encode_value};

use crate::backend::DocumentBackend;
use crate::document::{leaf_paths, Document};
use crate::error::{StoreError, StoreResult};
use crate::path::DocumentPath;
use crate::query::{FilterOp, Query};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Firestore REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Default database id.
pub const DEFAULT_DATABASE_ID: &str = "(default)";

/// Error bodies longer than this are truncated in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for a Firestore database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Database id within the project.
    pub database_id: String,
    /// REST endpoint; point this at an emulator for local runs.
    pub base_url: String,
    /// OAuth2 bearer token, if the endpoint requires one.
    pub access_token: Option<String>,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
        }
    }
}

impl FirestoreConfig {
    /// Creates a configuration for a project with default settings.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// Sets the REST endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// Document backend talking to Cloud Firestore.
#[derive(Debug, Clone)]
pub struct FirestoreBackend {
    config: FirestoreConfig,
    client: Client,
}

impl FirestoreBackend {
    /// Creates a backend whose HTTP client gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConfigurationMismatch`] if the project id is
    /// empty or the base URL does not parse, and
    /// [`StoreError::RemoteFault`] if the HTTP client cannot be built.
    pub fn new(config: FirestoreConfig, timeout: Duration) -> StoreResult<Self> {
        if config.project_id.trim().is_empty() {
            return Err(StoreError::configuration_mismatch(
                "firestore (missing project_id)",
            ));
        }
        if Url::parse(&config.base_url).is_err() {
            return Err(StoreError::configuration_mismatch(format!(
                "firestore (bad base_url {:?})",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::remote(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Builds `.../documents/<segments>`; a suffix is appended to the last
    /// segment (`:runQuery`).
    fn documents_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        suffix: &str,
    ) -> StoreResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| StoreError::configuration_mismatch(format!("firestore ({e})")))?;

        let mut all: Vec<String> = vec![
            "projects".to_string(),
            self.config.project_id.clone(),
            "databases".to_string(),
            self.config.database_id.clone(),
            "documents".to_string(),
        ];
        all.extend(segments.into_iter().map(str::to_string));
        if let Some(last) = all.last_mut() {
            last.push_str(suffix);
        }

        url.path_segments_mut()
            .map_err(|()| StoreError::configuration_mismatch("firestore (base_url cannot be a base)"))?
            .pop_if_empty()
            .extend(all.iter().map(String::as_str));
        Ok(url)
    }

    fn document_url(&self, path: &DocumentPath) -> StoreResult<Url> {
        self.documents_url(path.segments(), "")
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> StoreResult<Response> {
        self.authorize(request).send().await.map_err(|e| {
            warn!(operation, error = %e, "firestore request failed");
            StoreError::remote(format!("{operation}: {e}"))
        })
    }

    async fn read_json(response: Response, operation: &str) -> StoreResult<Value> {
        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::remote(format!("{operation}: malformed response: {e}")))
    }
}

async fn fail_on_error_status(response: Response, operation: &str) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    warn!(operation, status = %status, "firestore rejected request");
    Err(StoreError::remote(format!("{operation}: HTTP {status}: {body}")))
}

/// Maps a filter operator to its Firestore `FieldFilter.Operator` name.
pub fn operator_name(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Equal => "EQUAL",
        FilterOp::NotEqual => "NOT_EQUAL",
        FilterOp::LessThan => "LESS_THAN",
        FilterOp::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        FilterOp::GreaterThan => "GREATER_THAN",
        FilterOp::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
        FilterOp::ArrayContains => "ARRAY_CONTAINS",
    }
}

/// Builds the `runQuery` request body for a query.
pub fn structured_query(query: &Query) -> Value {
    let filter = query.filter();
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": query.collection().collection_id() }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": filter.field().to_string() },
                    "op": operator_name(filter.op()),
                    "value": { "stringValue": filter.value() }
                }
            }
        }
    })
}

#[async_trait]
impl DocumentBackend for FirestoreBackend {
    fn backend_tag(&self) -> &'static str {
        "firestore"
    }

    async fn merge_document(&self, path: &DocumentPath, fields: &Document) -> StoreResult<()> {
        let mut url = self.document_url(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for field in leaf_paths(fields) {
                pairs.append_pair("updateMask.fieldPaths", &field.to_string());
            }
        }
        debug!(path = %path, "firestore merge-write");

        let body = json!({ "fields": encode_fields(fields)? });
        let response = self.send(self.client.patch(url).json(&body), "merge").await?;
        fail_on_error_status(response, "merge").await?;
        Ok(())
    }

    async fn get_document(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let url = self.document_url(path)?;
        let response = self.send(self.client.get(url), "get").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = fail_on_error_status(response, "get").await?;
        let body = Self::read_json(response, "get").await?;
        decode_fields(body.get("fields")).map(Some)
    }

    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()> {
        let url = self.document_url(path)?;
        let response = self.send(self.client.delete(url), "delete").await?;
        fail_on_error_status(response, "delete").await?;
        Ok(())
    }

    async fn run_query(&self, query: &Query) -> StoreResult<Vec<(String, Document)>> {
        let parent: Vec<&str> = query
            .collection()
            .parent_document()
            .map(|p| p.split('/').collect())
            .unwrap_or_default();
        let url = self.documents_url(parent, ":runQuery")?;
        debug!(collection = %query.collection(), filter = %query.filter(), "firestore query");

        let response = self
            .send(self.client.post(url).json(&structured_query(query)), "query")
            .await?;
        let response = fail_on_error_status(response, "query").await?;
        let body = Self::read_json(response, "query").await?;

        let rows = body
            .as_array()
            .ok_or_else(|| StoreError::remote("query: response is not an array"))?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            // Rows without a document only carry progress information.
            let Some(document) = row.get("document") else {
                continue;
            };
            let id = document
                .get("name")
                .and_then(Value::as_str)
                .and_then(|name| name.rsplit('/').next())
                .ok_or_else(|| StoreError::remote("query: result without a document name"))?;
            results.push((id.to_string(), decode_fields(document.get("fields"))?));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::CollectionPath;

    fn backend() -> FirestoreBackend {
        FirestoreBackend::new(
            FirestoreConfig::new("demo").with_base_url("http://localhost:8080/v1"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn requires_project_id() {
        let err = FirestoreBackend::new(FirestoreConfig::default(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::ConfigurationMismatch { .. }));
    }

    #[test]
    fn document_urls_escape_segments() {
        let path = DocumentPath::parse("/Clients/Last Ping Log").unwrap();
        let url = backend().document_url(&path).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/Clients/Last%20Ping%20Log"
        );
    }

    #[test]
    fn query_urls_target_parent_document() {
        let b = backend();
        let root = b.documents_url(Vec::<&str>::new(), ":runQuery").unwrap();
        assert!(root.as_str().ends_with("/databases/(default)/documents:runQuery"));

        let nested = b.documents_url(["Users", "alice"], ":runQuery").unwrap();
        assert!(nested.as_str().ends_with("/documents/Users/alice:runQuery"));
    }

    #[test]
    fn structured_query_shape() {
        let query = Query::from_spec(
            CollectionPath::parse("/Users/alice/Devices/").unwrap(),
            &[json!("last ip"), json!("=="), json!("10.0.0.1")],
        )
        .unwrap();
        let body = structured_query(&query);
        assert_eq!(
            body["structuredQuery"]["from"][0]["collectionId"],
            json!("Devices")
        );
        let filter = &body["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], json!("`last ip`"));
        assert_eq!(filter["op"], json!("EQUAL"));
        assert_eq!(filter["value"], json!({"stringValue": "10.0.0.1"}));
    }
}
