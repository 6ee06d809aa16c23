//! HTTP front door.
//!
//! Two surfaces over one dispatcher:
//! - `POST /mcp` — MCP over JSON-RPC 2.0
//! - `GET /`, `GET /health`, `GET /tools/list`, `POST /tools/call` — a plain
//!   REST surface for callers that do not speak MCP
//!
//! Status codes follow the protocol split: only an envelope the server
//! cannot decode earns HTTP 400, an uncaught fault earns HTTP 500, and
//! everything else is HTTP 200 with any tool failure carried in the payload.
//! Requests share nothing mutable, so any number can run concurrently.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::mcp::types::error_codes;
use crate::mcp::{Dispatcher, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};

// ─── State and Wiring ────────────────────────────────────────────────────────

/// Shared state handed to every request. Immutable after startup.
pub struct AppState {
    pub dispatcher: Dispatcher,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/tools/list", get(rest_list_tools))
        .route("/tools/call", post(rest_call_tool))
        .route("/mcp", post(mcp_endpoint))
        .with_state(state)
}

/// Serve until the process receives an interrupt.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install interrupt handler; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

// ─── JSON-RPC Endpoint ───────────────────────────────────────────────────────

async fn mcp_endpoint(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match decode_envelope(&body) {
        Ok(request) => request,
        Err(EnvelopeError::Parse(reason)) => {
            tracing::warn!(%reason, "unparseable request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("parse error: {reason}"),
                )),
            )
                .into_response();
        }
        Err(EnvelopeError::Invalid { id, reason }) => {
            tracing::warn!(%reason, "invalid request envelope");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("invalid request: {reason}"),
                )),
            )
                .into_response();
        }
    };

    let id = request.id.clone().unwrap_or(Value::Null);
    match AssertUnwindSafe(handle_rpc(&state, request)).catch_unwind().await {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        // Notifications are acknowledged with an empty 200.
        Ok(None) => StatusCode::OK.into_response(),
        Err(panic) => {
            tracing::error!(reason = %panic_message(panic.as_ref()), "request handler panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::error(
                    id,
                    error_codes::INTERNAL_ERROR,
                    "internal error",
                )),
            )
                .into_response()
        }
    }
}

/// Route one decoded JSON-RPC request. `None` means no response body.
///
/// Notifications execute like any other request; only their response is
/// suppressed, per JSON-RPC 2.0.
async fn handle_rpc(state: &AppState, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let is_notification = request.is_notification();
    let method = request.method.clone();
    let id = request.id.clone().unwrap_or(Value::Null);

    let response = match method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": "vault-bridge",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(
            id,
            json!({"tools": state.dispatcher.registry().listing()}),
        ),
        "tools/call" => {
            let params = request.params.unwrap_or_else(|| json!({}));
            match params.get("name").and_then(Value::as_str) {
                Some(name) => {
                    let arguments = params
                        .get("arguments")
                        .cloned()
                        .unwrap_or_else(|| json!({}));
                    let result = state.dispatcher.dispatch(name, &arguments).await;
                    let payload = serde_json::to_value(&result)
                        .unwrap_or_else(|_| json!({"content": [], "isError": true}));
                    JsonRpcResponse::success(id, payload)
                }
                None => JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "params.name is required",
                ),
            }
        }
        // Lifecycle notifications carry no work of their own.
        lifecycle if lifecycle.starts_with("notifications/") => {
            JsonRpcResponse::success(id, json!({}))
        }
        other => JsonRpcResponse::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("method not found: {other}"),
        ),
    };

    if is_notification {
        tracing::debug!(method = %method, "executed notification without response");
        return None;
    }
    Some(response)
}

// ─── Envelope Decoding ───────────────────────────────────────────────────────

#[derive(Debug)]
enum EnvelopeError {
    /// Body is not JSON at all.
    Parse(String),
    /// Body is JSON but not a JSON-RPC 2.0 request.
    Invalid { id: Value, reason: String },
}

fn decode_envelope(body: &[u8]) -> Result<JsonRpcRequest, EnvelopeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| EnvelopeError::Parse(e.to_string()))?;

    // Keep whatever id the caller sent so the error response can echo it.
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest =
        serde_json::from_value(value).map_err(|e| EnvelopeError::Invalid {
            id: id.clone(),
            reason: e.to_string(),
        })?;

    if request.jsonrpc != "2.0" {
        return Err(EnvelopeError::Invalid {
            id,
            reason: format!("unsupported jsonrpc version: '{}'", request.jsonrpc),
        });
    }
    Ok(request)
}

// ─── REST Endpoints ──────────────────────────────────────────────────────────

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "vault-bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "mcp": "/mcp",
            "list_tools": "/tools/list",
            "call_tool": "/tools/call",
        },
    }))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "vault-bridge"}))
}

async fn rest_list_tools(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({"tools": state.dispatcher.registry().listing()}))
}

#[derive(Debug, Deserialize)]
struct RestToolCall {
    name: String,
    #[serde(default = "empty_arguments")]
    arguments: Value,
}

fn empty_arguments() -> Value {
    json!({})
}

async fn rest_call_tool(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let call: RestToolCall = match serde_json::from_slice(&body) {
        Ok(call) => call,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "error": format!("invalid tool call body: {e}")})),
            )
                .into_response();
        }
    };

    let dispatch = state.dispatcher.dispatch(&call.name, &call.arguments);
    let result = match AssertUnwindSafe(dispatch).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            tracing::error!(reason = %panic_message(panic.as_ref()), "request handler panicked");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "internal error"})),
            )
                .into_response();
        }
    };

    if result.is_error {
        return Json(json!({
            "success": false,
            "tool": call.name,
            "error": result.first_text(),
        }))
        .into_response();
    }
    Json(json!({
        "success": true,
        "tool": call.name,
        "result": rest_result_value(result.first_text()),
    }))
    .into_response()
}

/// Tool output that parses as JSON is returned structured; anything else
/// stays a plain string.
fn rest_result_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
