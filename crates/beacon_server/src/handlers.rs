//! HTTP request handlers.

use crate::audit::AuditLogger;
use crate::validation::{parse_body, require_strings, ValidationFailure};
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use beacon_sms::Dispatcher;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Required keys of a ping body.
pub const PING_KEYS: [&str; 2] = ["Client ID", "Software Version"];

/// Required keys of a send-test-message body.
pub const SEND_MESSAGE_KEYS: [&str; 3] = ["Client ID", "SMS Body", "Phone"];

/// Cause reported when the SMS provider fails.
pub const SMS_FAILURE_CAUSE: &str = "An unknown error occured trying to send SMS";

/// Client IP recorded when the peer address is unavailable.
pub const UNKNOWN_IP: &str = "unknown";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Audit log writer.
    pub audit: Arc<AuditLogger>,
    /// SMS sender.
    pub dispatcher: Arc<Dispatcher>,
}

/// The `{"Status": ..., "Cause": ...}` envelope every endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    /// `Success` or `Fail`.
    #[serde(rename = "Status")]
    pub status: &'static str,
    /// Failure reason, absent on success.
    #[serde(rename = "Cause", skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl StatusBody {
    /// A success envelope.
    pub fn success() -> Self {
        Self {
            status: "Success",
            cause: None,
        }
    }

    /// A failure envelope.
    pub fn fail(cause: impl Into<String>) -> Self {
        Self {
            status: "Fail",
            cause: Some(cause.into()),
        }
    }
}

fn respond(code: StatusCode, body: StatusBody) -> Response {
    (code, Json(body)).into_response()
}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        respond(StatusCode::BAD_REQUEST, StatusBody::fail(self.to_string()))
    }
}

/// Current time as an RFC 3339 UTC string with nanosecond precision.
///
/// SMS audit entries are keyed by this value, so two sends from one client
/// must not share it.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn client_ip(connect: Option<ConnectInfo<SocketAddr>>) -> String {
    connect.map_or_else(|| UNKNOWN_IP.to_string(), |ConnectInfo(addr)| addr.ip().to_string())
}

/// `GET /healthz`
pub async fn healthz() -> Json<StatusBody> {
    Json(StatusBody::success())
}

/// `POST /api/ping`
///
/// Records the client's latest ping. Audit failures do not change the
/// response.
pub async fn ping(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    raw: Bytes,
) -> Response {
    let body = match parse_body(&raw) {
        Ok(body) => body,
        Err(failure) => return failure.into_response(),
    };
    let [client_id, version] = match require_strings(&body, PING_KEYS) {
        Ok(values) => values,
        Err(failure) => return failure.into_response(),
    };

    let timestamp = timestamp_now();
    let ip = client_ip(connect);
    info!(
        timestamp = %timestamp,
        client_id = %client_id,
        ip = %ip,
        version = %version,
        "PING"
    );
    state.audit.log_ping(&timestamp, client_id, &ip, version).await;

    respond(StatusCode::OK, StatusBody::success())
}

/// `POST /api/send_test_message`
///
/// Sends one SMS and records the attempt, successful or not.
pub async fn send_test_message(State(state): State<AppState>, raw: Bytes) -> Response {
    let body = match parse_body(&raw) {
        Ok(body) => body,
        Err(failure) => return failure.into_response(),
    };
    let [client_id, message, phone] = match require_strings(&body, SEND_MESSAGE_KEYS) {
        Ok(values) => values,
        Err(failure) => return failure.into_response(),
    };

    let timestamp = timestamp_now();
    let sent = state.dispatcher.dispatch(message, phone).await;
    state
        .audit
        .log_sms_sent(&timestamp, client_id, message, phone, sent)
        .await;

    if sent {
        info!(client_id = %client_id, to = %phone, "test message sent");
        respond(StatusCode::OK, StatusBody::success())
    } else {
        warn!(client_id = %client_id, to = %phone, "test message failed");
        respond(StatusCode::BAD_GATEWAY, StatusBody::fail(SMS_FAILURE_CAUSE))
    }
}
