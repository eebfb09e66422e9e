//! Firestore backend against an in-process stand-in for the REST API.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use beacon_store::{DocumentStore, FirestoreBackend, FirestoreConfig, StoreError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const READ_TIME: &str = "2024-01-01T00:00:00Z";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
}

#[derive(Default)]
struct FakeFirestore {
    /// Encoded fields keyed by document name (`projects/.../documents/A/b`).
    documents: BTreeMap<String, Value>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<FakeFirestore>>;

fn document_name(path: &str) -> String {
    path.trim_start_matches("/v1/").to_string()
}

fn matches_filter(fields: &Value, query: &Value) -> bool {
    let filter = &query["structuredQuery"]["where"]["fieldFilter"];
    let field = filter["field"]["fieldPath"].as_str().unwrap_or_default();
    filter["op"] == "EQUAL" && fields[field] == filter["value"]
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let mut state = state.lock();
    state.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    if path.contains("/documents/Broken/") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend unavailable").into_response();
    }
    if method == Method::POST && path.ends_with(":runQuery") {
        let mut rows = vec![json!({ "readTime": READ_TIME })];
        rows.extend(
            state
                .documents
                .iter()
                .filter(|(_, fields)| matches_filter(fields, &body))
                .map(|(name, fields)| {
                    json!({ "document": { "name": name, "fields": fields }, "readTime": READ_TIME })
                }),
        );
        return Json(Value::Array(rows)).into_response();
    }

    let name = document_name(&path);
    match method.as_str() {
        "PATCH" => {
            let stored = state
                .documents
                .entry(name.clone())
                .or_insert_with(|| json!({}));
            if let (Some(stored), Some(incoming)) =
                (stored.as_object_mut(), body["fields"].as_object())
            {
                for (key, value) in incoming {
                    stored.insert(key.clone(), value.clone());
                }
            }
            let fields = stored.clone();
            Json(json!({ "name": name, "fields": fields })).into_response()
        }
        "GET" => match state.documents.get(&name) {
            Some(fields) => Json(json!({ "name": name, "fields": fields })).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": { "code": 404, "status": "NOT_FOUND" } })),
            )
                .into_response(),
        },
        "DELETE" => {
            state.documents.remove(&name);
            Json(json!({})).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn start() -> (Shared, String) {
    let state = Shared::default();
    let app = Router::new().fallback(handle).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (state, format!("http://{addr}/v1"))
}

async fn firestore() -> (Shared, DocumentStore) {
    let (state, base_url) = start().await;
    let config = FirestoreConfig::new("demo")
        .with_base_url(base_url)
        .with_access_token("t0ken");
    let backend = FirestoreBackend::new(config, Duration::from_secs(5)).unwrap();
    (state, DocumentStore::new(backend))
}

fn requests(state: &Shared, method: Method) -> Vec<Recorded> {
    state
        .lock()
        .requests
        .iter()
        .filter(|r| r.method == method)
        .cloned()
        .collect()
}

#[tokio::test]
async fn merge_write_sends_quoted_update_mask() {
    let (state, store) = firestore().await;
    store
        .write_value(
            "/Clients/c1",
            json!({ "profile": { "last ip": "10.0.0.1" }, "role": "admin" }),
        )
        .await
        .unwrap();

    let patches = requests(&state, Method::PATCH);
    assert_eq!(patches.len(), 1);
    assert_eq!(
        patches[0].path,
        "/v1/projects/demo/databases/(default)/documents/Clients/c1"
    );
    let query = patches[0].query.as_deref().unwrap();
    let mut mask: Vec<&str> = query.split('&').collect();
    mask.sort_unstable();
    assert_eq!(
        mask,
        [
            "updateMask.fieldPaths=profile.%60last+ip%60",
            "updateMask.fieldPaths=role",
        ]
    );
}

#[tokio::test]
async fn written_documents_read_back_decoded() {
    let (_state, store) = firestore().await;
    store
        .write_value(
            "/Clients/c1",
            json!({ "count": 3, "ok": true, "tags": ["a", "b"], "nested": { "x": 1.5 } }),
        )
        .await
        .unwrap();
    store
        .write_value("/Clients/c1", json!({ "ok": false }))
        .await
        .unwrap();

    let fields = store.read("/Clients/c1").await.unwrap();
    assert_eq!(
        Value::Object(fields),
        json!({ "count": 3, "ok": false, "tags": ["a", "b"], "nested": { "x": 1.5 } })
    );
}

#[tokio::test]
async fn missing_documents_are_absent_not_faults() {
    let (state, store) = firestore().await;

    assert!(!store.exists("/Clients/ghost").await.unwrap());
    let err = store.read("/Clients/ghost").await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.delete("/Clients/ghost").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert!(requests(&state, Method::DELETE).is_empty());
}

#[tokio::test]
async fn delete_removes_existing_document() {
    let (state, store) = firestore().await;
    store
        .write_value("/Clients/c1", json!({ "role": "admin" }))
        .await
        .unwrap();

    store.delete("/Clients/c1").await.unwrap();
    assert_eq!(requests(&state, Method::DELETE).len(), 1);
    assert!(!store.exists("/Clients/c1").await.unwrap());
}

#[tokio::test]
async fn query_skips_progress_rows_and_keys_by_document_id() {
    let (state, store) = firestore().await;
    store
        .write_value("/Users/alice", json!({ "role": "admin" }))
        .await
        .unwrap();
    store
        .write_value("/Users/bob", json!({ "role": "guest" }))
        .await
        .unwrap();

    let admins = store
        .query_by_fields("/Users/", &[json!("role"), json!("=="), json!("admin")])
        .await
        .unwrap();
    assert_eq!(admins.keys().collect::<Vec<_>>(), vec!["alice"]);
    assert_eq!(Value::Object(admins["alice"].clone()), json!({ "role": "admin" }));

    let posts = requests(&state, Method::POST);
    assert_eq!(posts.len(), 1);
    assert!(posts[0].path.ends_with("/documents:runQuery"));
}

#[tokio::test]
async fn error_statuses_become_remote_faults() {
    let (_state, store) = firestore().await;
    let err = store.read("/Broken/doc").await.unwrap_err();
    assert!(err.is_remote());
    assert!(err.to_string().contains("backend unavailable"));

    let err = store
        .write_value("/Broken/doc", json!({ "a": 1 }))
        .await
        .unwrap_err();
    assert!(err.is_remote());
}

#[tokio::test]
async fn every_request_carries_the_bearer_token() {
    let (state, store) = firestore().await;
    store
        .write_value("/Clients/c1", json!({ "a": 1 }))
        .await
        .unwrap();
    store.read("/Clients/c1").await.unwrap();

    let seen = state.lock().requests.clone();
    assert_eq!(seen.len(), 2);
    for request in seen {
        assert_eq!(request.authorization.as_deref(), Some("Bearer t0ken"));
    }
}

#[tokio::test]
async fn oversized_integers_never_reach_the_server() {
    let (state, store) = firestore().await;
    let err = store
        .write_value("/Clients/c1", json!({ "big": u64::MAX }))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidPayloadShape { .. }));
    assert!(state.lock().requests.is_empty());
}
