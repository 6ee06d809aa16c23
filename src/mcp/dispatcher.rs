//! Tool dispatcher.
//!
//! The dispatcher is the bridge between the protocol layer and the vault.
//! Every tool call funnels through [`Dispatcher::dispatch`], which handles:
//! - Validation (tool exists, arguments match schema)
//! - Execution via the shared vault client
//! - A single replay for read-only calls that hit a transport failure
//! - Packaging success or failure into a [`ToolResult`]
//!
//! Tool failures never escape as protocol errors. Whatever goes wrong past
//! the envelope, the dispatcher answers with a well-formed result carrying
//! `is_error`.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use super::errors::ToolError;
use super::registry::{ToolArgs, ToolRegistry};
use super::types::{ContentBlock, ToolResult};
use crate::vault::VaultClient;

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// Routes validated tool calls to their handlers.
pub struct Dispatcher {
    registry: ToolRegistry,
    vault: Arc<VaultClient>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, vault: Arc<VaultClient>) -> Self {
        Self { registry, vault }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatch a single tool call: validate, execute, package.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> ToolResult {
        let start = Instant::now();

        // 1. Validate against the registered schema. Failures become tool
        //    errors without touching the vault.
        let definition = match self.registry.validate_call(name, arguments) {
            Ok(definition) => definition,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "rejected tool call");
                return ToolResult::error(e.to_string());
            }
        };

        // 2. Execute. Read-only single-call tools get one replay after a
        //    transport failure; nothing else is ever retried.
        let args = ToolArgs::new(definition.name, arguments.clone());
        let mut outcome = (definition.handler)(Arc::clone(&self.vault), args).await;

        if definition.read_retry && is_replayable(&outcome) {
            tracing::debug!(tool = %name, "replaying read after transport failure");
            let args = ToolArgs::new(definition.name, arguments.clone());
            outcome = (definition.handler)(Arc::clone(&self.vault), args).await;
        }

        // 3. Package.
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(content) => {
                tracing::info!(tool = %name, elapsed_ms, "tool call succeeded");
                ToolResult::ok(content)
            }
            Err(e) => {
                tracing::warn!(tool = %name, elapsed_ms, error = %e, "tool call failed");
                ToolResult::error(e.to_string())
            }
        }
    }
}

// ─── Free Functions ──────────────────────────────────────────────────────────

/// Whether a failed attempt qualifies for the single read replay.
///
/// Transport failures only. Timeouts are excluded: a timed-out call has
/// already spent the caller's latency budget once.
fn is_replayable(outcome: &Result<Vec<ContentBlock>, ToolError>) -> bool {
    match outcome {
        Err(ToolError::Vault(e)) => e.is_transport_failure(),
        _ => false,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::config::{VaultConnectionConfig, VaultProtocol};
    use crate::mcp::registry::{HandlerFuture, ToolDefinition, ToolHandler};
    use crate::vault::VaultError;

    // Handlers are fn pointers, so per-test call counters live in statics.
    static FLAKY_CALLS: AtomicUsize = AtomicUsize::new(0);
    static TIMEOUT_CALLS: AtomicUsize = AtomicUsize::new(0);
    static WRITE_CALLS: AtomicUsize = AtomicUsize::new(0);
    static UNVALIDATED_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn test_vault() -> Arc<VaultClient> {
        let config = VaultConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            protocol: VaultProtocol::Http,
            api_key: "test-key".to_string(),
            verify_tls: false,
        };
        Arc::new(VaultClient::new(&config).unwrap())
    }

    fn ok_handler(_vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
        Box::pin(async move {
            let path = args.required_str("path")?.to_string();
            Ok(vec![ContentBlock::text(format!("read {path}"))])
        })
    }

    fn flaky_handler(_vault: Arc<VaultClient>, _args: ToolArgs) -> HandlerFuture {
        Box::pin(async {
            if FLAKY_CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ToolError::Vault(VaultError::Transport {
                    reason: "connection reset".to_string(),
                }))
            } else {
                Ok(vec![ContentBlock::text("second attempt")])
            }
        })
    }

    fn timeout_handler(_vault: Arc<VaultClient>, _args: ToolArgs) -> HandlerFuture {
        Box::pin(async {
            TIMEOUT_CALLS.fetch_add(1, Ordering::SeqCst);
            Err(ToolError::Vault(VaultError::Timeout { timeout_ms: 6000 }))
        })
    }

    fn failing_write_handler(_vault: Arc<VaultClient>, _args: ToolArgs) -> HandlerFuture {
        Box::pin(async {
            WRITE_CALLS.fetch_add(1, Ordering::SeqCst);
            Err(ToolError::Vault(VaultError::Transport {
                reason: "connection reset".to_string(),
            }))
        })
    }

    fn counting_handler(_vault: Arc<VaultClient>, _args: ToolArgs) -> HandlerFuture {
        Box::pin(async {
            UNVALIDATED_CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ContentBlock::text("ok")])
        })
    }

    fn not_found_handler(_vault: Arc<VaultClient>, _args: ToolArgs) -> HandlerFuture {
        Box::pin(async {
            Err(ToolError::Vault(VaultError::NotFound {
                path: "missing.md".to_string(),
            }))
        })
    }

    fn tool(name: &'static str, read_retry: bool, handler: ToolHandler) -> ToolDefinition {
        ToolDefinition {
            name,
            description: "Dispatcher test tool",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Vault-relative path"}
                },
                "required": ["path"]
            }),
            read_retry,
            handler,
        }
    }

    fn dispatcher_with(definitions: Vec<ToolDefinition>) -> Dispatcher {
        let mut registry = ToolRegistry::new();
        for definition in definitions {
            registry.register(definition).unwrap();
        }
        Dispatcher::new(registry, test_vault())
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let dispatcher = dispatcher_with(vec![tool("read_note", true, ok_handler)]);
        let result = dispatcher
            .dispatch("read_note", &json!({"path": "inbox.md"}))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.first_text(), "read inbox.md");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_tool_error() {
        let dispatcher = dispatcher_with(vec![]);
        let result = dispatcher.dispatch("ghost", &json!({})).await;
        assert!(result.is_error);
        assert_eq!(result.first_text(), "unknown tool: 'ghost'");
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_handler() {
        let dispatcher = dispatcher_with(vec![tool("read_note", false, counting_handler)]);
        let result = dispatcher.dispatch("read_note", &json!({})).await;
        assert!(result.is_error);
        assert!(result.first_text().contains("missing required field: 'path'"));
        assert_eq!(UNVALIDATED_CALLS.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_replayed_once_for_reads() {
        let dispatcher = dispatcher_with(vec![tool("read_note", true, flaky_handler)]);
        let result = dispatcher
            .dispatch("read_note", &json!({"path": "inbox.md"}))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.first_text(), "second attempt");
        assert_eq!(FLAKY_CALLS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_not_replayed() {
        let dispatcher = dispatcher_with(vec![tool("read_note", true, timeout_handler)]);
        let result = dispatcher
            .dispatch("read_note", &json!({"path": "slow.md"}))
            .await;
        assert!(result.is_error);
        assert!(result.first_text().contains("timed out"));
        assert_eq!(TIMEOUT_CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_not_replayed_for_writes() {
        let dispatcher = dispatcher_with(vec![tool("append_note", false, failing_write_handler)]);
        let result = dispatcher
            .dispatch("append_note", &json!({"path": "inbox.md"}))
            .await;
        assert!(result.is_error);
        assert!(result.first_text().contains("vault transport failure"));
        assert_eq!(WRITE_CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_surfaces_path_in_message() {
        let dispatcher = dispatcher_with(vec![tool("read_note", true, not_found_handler)]);
        let result = dispatcher
            .dispatch("read_note", &json!({"path": "missing.md"}))
            .await;
        assert!(result.is_error);
        assert_eq!(result.first_text(), "note not found at path: missing.md");
    }

    #[test]
    fn test_is_replayable_transport_only() {
        let transport: Result<Vec<ContentBlock>, ToolError> =
            Err(ToolError::Vault(VaultError::Transport {
                reason: "reset".to_string(),
            }));
        assert!(is_replayable(&transport));

        let timeout: Result<Vec<ContentBlock>, ToolError> =
            Err(ToolError::Vault(VaultError::Timeout { timeout_ms: 6000 }));
        assert!(!is_replayable(&timeout));

        let not_found: Result<Vec<ContentBlock>, ToolError> =
            Err(ToolError::Vault(VaultError::NotFound {
                path: "a.md".to_string(),
            }));
        assert!(!is_replayable(&not_found));

        let ok: Result<Vec<ContentBlock>, ToolError> = Ok(vec![]);
        assert!(!is_replayable(&ok));
    }
}
