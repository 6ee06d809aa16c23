//! Typed HTTP client for the vault's local REST API.
//!
//! Owns base-URL composition, bearer auth, TLS policy, and timeouts. Every
//! response is classified into [`VaultError`] variants; callers never see raw
//! status codes. The client performs no retries of its own — retry policy
//! lives in the dispatcher.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::errors::{VaultError, VaultErrorBody};
use crate::config::VaultConnectionConfig;

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Total request timeout for vault calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// Body content type for note writes.
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// Body content type for structured (JsonLogic) searches.
const JSONLOGIC_CONTENT_TYPE: &str = "application/vnd.olrapi.jsonlogic+json";

/// Body content type for Dataview DQL searches.
const DQL_CONTENT_TYPE: &str = "application/vnd.olrapi.dataview.dql+txt";

// ─── Response Types ──────────────────────────────────────────────────────────

/// Directory listing returned by the vault.
#[derive(Debug, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Raw success response from the vault.
#[derive(Debug)]
pub struct VaultResponse {
    body: String,
}

impl VaultResponse {
    /// The response body, unmodified.
    pub fn into_text(self) -> String {
        self.body
    }

    /// Decode the response body as JSON.
    ///
    /// An undecodable body on a success status is a transport failure: the
    /// vault answered, but not with what its API promises.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, VaultError> {
        serde_json::from_str(&self.body).map_err(|e| VaultError::Transport {
            reason: format!("undecodable vault response: {e}"),
        })
    }
}

// ─── VaultClient ─────────────────────────────────────────────────────────────

/// Client for the vault's local REST API.
///
/// Built once at startup from [`VaultConnectionConfig`] and shared read-only
/// across all in-flight tool calls.
pub struct VaultClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl VaultClient {
    /// Create a vault client with the standard request timeout.
    pub fn new(config: &VaultConnectionConfig) -> Result<Self, VaultError> {
        Self::with_request_timeout(config, REQUEST_TIMEOUT)
    }

    /// Create a vault client with a specific request timeout.
    ///
    /// The standard timeout suits interactive use; latency-sensitive callers
    /// can pin a tighter budget.
    pub fn with_request_timeout(
        config: &VaultConnectionConfig,
        request_timeout: Duration,
    ) -> Result<Self, VaultError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| VaultError::Transport {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
            request_timeout,
        })
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Note Operations ─────────────────────────────────────────────────

    /// List files and directories at the vault root.
    pub async fn list_root(&self) -> Result<FileListing, VaultError> {
        let url = format!("{}/vault/", self.base_url);
        self.send(self.http.get(&url), "/").await?.into_json()
    }

    /// List files and directories under a vault directory.
    pub async fn list_dir(&self, dirpath: &str) -> Result<FileListing, VaultError> {
        let trimmed = dirpath.trim_matches('/');
        let url = format!("{}/vault/{}/", self.base_url, encode_path(trimmed));
        self.send(self.http.get(&url), dirpath).await?.into_json()
    }

    /// Read a note's content, byte for byte.
    pub async fn read_note(&self, path: &str) -> Result<String, VaultError> {
        let url = self.note_url(path);
        Ok(self.send(self.http.get(&url), path).await?.into_text())
    }

    /// Create a note, or replace its content if it already exists.
    pub async fn put_note(&self, path: &str, content: &str) -> Result<(), VaultError> {
        let url = self.note_url(path);
        let request = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)
            .body(content.to_string());
        self.send(request, path).await?;
        Ok(())
    }

    /// Append content to a note, creating it if missing.
    pub async fn append_note(&self, path: &str, content: &str) -> Result<(), VaultError> {
        let url = self.note_url(path);
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)
            .body(content.to_string());
        self.send(request, path).await?;
        Ok(())
    }

    /// Modify a note relative to a heading, block reference, or frontmatter
    /// field via the vault's patch interface.
    ///
    /// Targeting headers are only sent when a target is given; without them
    /// the vault applies the operation to the note body as a whole.
    pub async fn patch_note(
        &self,
        path: &str,
        operation: &str,
        target_type: Option<&str>,
        target: Option<&str>,
        content: &str,
    ) -> Result<(), VaultError> {
        let url = self.note_url(path);
        let mut request = self
            .http
            .patch(&url)
            .header(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)
            .header("Operation", operation);

        if let Some(target_type) = target_type {
            request = request.header("Target-Type", target_type);
        }
        if let Some(target) = target {
            // Header values must stay ASCII; targets may name unicode headings.
            request = request
                .header("Target", urlencoding::encode(target).into_owned())
                .header("Create-Target-If-Missing", "true");
        }

        self.send(request.body(content.to_string()), path).await?;
        Ok(())
    }

    /// Delete a note.
    pub async fn delete_note(&self, path: &str) -> Result<(), VaultError> {
        let url = self.note_url(path);
        self.send(self.http.delete(&url), path).await?;
        Ok(())
    }

    // ─── Search Operations ───────────────────────────────────────────────

    /// Full-text search across the vault, with surrounding context.
    pub async fn search_simple(
        &self,
        query: &str,
        context_length: u32,
    ) -> Result<serde_json::Value, VaultError> {
        let url = format!("{}/search/simple/", self.base_url);
        let request = self.http.post(&url).query(&[
            ("query", query.to_string()),
            ("contextLength", context_length.to_string()),
        ]);
        self.send(request, "/search/simple/").await?.into_json()
    }

    /// Structured search using the vault's JsonLogic interface.
    pub async fn search_jsonlogic(
        &self,
        query: &serde_json::Value,
    ) -> Result<serde_json::Value, VaultError> {
        let url = format!("{}/search/", self.base_url);
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, JSONLOGIC_CONTENT_TYPE)
            .body(query.to_string());
        self.send(request, "/search/").await?.into_json()
    }

    /// Run a Dataview DQL query against the vault's search interface.
    pub async fn search_dql(&self, dql: &str) -> Result<serde_json::Value, VaultError> {
        let url = format!("{}/search/", self.base_url);
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, DQL_CONTENT_TYPE)
            .body(dql.to_string());
        self.send(request, "/search/").await?.into_json()
    }

    // ─── Periodic Note Operations ────────────────────────────────────────

    /// Read the current periodic note for a period.
    pub async fn periodic_note(&self, period: &str) -> Result<String, VaultError> {
        let url = format!("{}/periodic/{}/", self.base_url, encode_path(period));
        Ok(self.send(self.http.get(&url), period).await?.into_text())
    }

    /// The most recent periodic notes for a period.
    pub async fn recent_periodic_notes(
        &self,
        period: &str,
        limit: u32,
        include_content: bool,
    ) -> Result<serde_json::Value, VaultError> {
        let url = format!("{}/periodic/{}/recent", self.base_url, encode_path(period));
        let request = self.http.get(&url).query(&[
            ("limit", limit.to_string()),
            ("includeContent", include_content.to_string()),
        ]);
        self.send(request, period).await?.into_json()
    }

    // ─── Transport ───────────────────────────────────────────────────────

    /// URL for a note path under `/vault/`.
    fn note_url(&self, path: &str) -> String {
        format!("{}/vault/{}", self.base_url, encode_path(path))
    }

    /// Issue a request and classify the outcome.
    ///
    /// `context` is the caller-facing path or endpoint used in error
    /// messages, not the encoded URL.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<VaultResponse, VaultError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            let body = response.text().await.map_err(|e| VaultError::Transport {
                reason: format!("failed to read response body: {e}"),
            })?;
            return Ok(VaultResponse { body });
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, context, &body))
    }

    fn classify_send_error(&self, e: reqwest::Error) -> VaultError {
        if e.is_timeout() {
            VaultError::Timeout {
                timeout_ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            VaultError::Transport {
                reason: e.to_string(),
            }
        }
    }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Map a non-success vault status to the error taxonomy.
fn classify_status(status: u16, context: &str, body: &str) -> VaultError {
    let message = VaultErrorBody::parse(body)
        .map(|parsed| parsed.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));

    match status {
        401 | 403 => VaultError::Unauthorized { status },
        404 => VaultError::NotFound {
            path: context.to_string(),
        },
        409 => VaultError::Conflict { message },
        400..=499 => VaultError::BadRequest { status, message },
        _ => VaultError::Transport {
            reason: format!("vault returned HTTP {status}: {message}"),
        },
    }
}

/// Percent-encode a vault-relative path, preserving `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
