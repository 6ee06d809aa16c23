//! Tool-layer error types.

use thiserror::Error;

use crate::vault::VaultError;

/// Failures raised while resolving or executing a tool call.
///
/// Every variant surfaces as a tool-level error result, never as a JSON-RPC
/// protocol error. [`ToolError::DuplicateTool`] is the exception: it can only
/// occur during registry construction at startup, where it is fatal.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: '{name}'")]
    UnknownTool { name: String },

    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("duplicate tool registration: '{name}'")]
    DuplicateTool { name: &'static str },

    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl ToolError {
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}
