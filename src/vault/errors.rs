//! Vault client error types.
//!
//! Every failed vault call is classified into exactly one variant. The
//! display strings double as the tool-error messages served to MCP clients,
//! so they name the failure in caller terms (paths, not URLs).

use serde::Deserialize;
use thiserror::Error;

/// Errors produced by vault REST calls.
#[derive(Debug, Error)]
pub enum VaultError {
    /// No note or directory exists at the requested path (HTTP 404).
    #[error("note not found at path: {path}")]
    NotFound { path: String },

    /// The vault rejected the bearer credential (HTTP 401/403).
    #[error("vault rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The request conflicts with current vault state (HTTP 409).
    #[error("vault state conflict: {message}")]
    Conflict { message: String },

    /// The vault rejected the request as malformed (remaining 4xx).
    #[error("vault rejected request (HTTP {status}): {message}")]
    BadRequest { status: u16, message: String },

    /// Connection failure, 5xx response, or an undecodable success body.
    #[error("vault transport failure: {reason}")]
    Transport { reason: String },

    /// The vault did not answer within the request budget.
    #[error("vault request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl VaultError {
    /// Whether this failure is a transport failure.
    ///
    /// Transport failures are the only class the dispatcher will replay,
    /// and only for read-only tools.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, VaultError::Transport { .. })
    }
}

/// Error body the vault attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct VaultErrorBody {
    #[serde(default, alias = "errorCode")]
    pub error_code: i64,
    #[serde(default)]
    pub message: String,
}

impl VaultErrorBody {
    /// Parse a response body as a vault error payload, if it is one.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
