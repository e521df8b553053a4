use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};

pub const DEFAULT_CSRF_TOKEN: &str = "mock-csrf-token";
pub const CSRF_FAILURE_BODY: &str = "CSRF verification failed.";
/// Size of the `data` string served by `/large`, past ureq's default read cap.
pub const LARGE_DATA_LEN: usize = 11 * 1024 * 1024;
/// Latin-1 encoded body served by `/latin1/{code}`.
pub const LATIN1_BODY: &[u8] = b"caf\xe9 not found";

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub csrf_token: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct AppState {
    csrf_token: Arc<str>,
}

pub fn app(csrf_token: &str) -> Router {
    let state = AppState {
        csrf_token: Arc::from(csrf_token),
    };
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/malformed", any(malformed))
        .route("/large", any(large))
        .route("/latin1/{code}", any(latin1))
        .route("/protected", post(protected))
        .with_state(state)
}

pub async fn run(listener: TcpListener, csrf_token: &str) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app(csrf_token)).await
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Result<Json<Echo>, (StatusCode, String)> {
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}")))?
    };
    Ok(Json(Echo {
        method: method.to_string(),
        csrf_token: header_value(&headers, "x-csrftoken"),
        content_type: header_value(&headers, header::CONTENT_TYPE.as_str()),
        body,
    }))
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

async fn malformed() -> (StatusCode, &'static str) {
    (StatusCode::OK, "not-json")
}

async fn large() -> (StatusCode, String) {
    let mut body = String::with_capacity(LARGE_DATA_LEN + 16);
    body.push_str(r#"{"data":""#);
    body.extend(std::iter::repeat('a').take(LARGE_DATA_LEN));
    body.push_str(r#""}"#);
    (StatusCode::OK, body)
}

async fn latin1(Path(code): Path<u16>) -> (StatusCode, &'static [u8]) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, LATIN1_BODY)
}

async fn protected(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, (StatusCode, &'static str)> {
    match header_value(&headers, "x-csrftoken") {
        Some(token) if token == *state.csrf_token => Ok(Json(json!({"ok": true}))),
        other => {
            debug!(present = other.is_some(), "rejecting request without a valid CSRF token");
            Err((StatusCode::FORBIDDEN, CSRF_FAILURE_BODY))
        }
    }
}
