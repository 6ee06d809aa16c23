//! Tool definitions.
//!
//! Each submodule contributes a family of tools:
//! - `notes` — listing and reading
//! - `edit` — write, append, patch, delete
//! - `search` — text, JsonLogic, and recent-changes queries
//! - `periodic` — daily/weekly/monthly/quarterly/yearly notes
//!
//! [`build_registry`] assembles the full set in a fixed order. Tool names
//! are unique by construction; a collision here is a programming error and
//! fails startup.

pub mod edit;
pub mod notes;
pub mod periodic;
pub mod search;

use serde_json::Value;

use crate::mcp::errors::ToolError;
use crate::mcp::registry::ToolRegistry;

/// Build the complete tool registry.
pub fn build_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    let definitions = notes::definitions()
        .into_iter()
        .chain(edit::definitions())
        .chain(search::definitions())
        .chain(periodic::definitions());
    for definition in definitions {
        registry.register(definition)?;
    }
    Ok(registry)
}

/// Render a JSON value for tool output.
pub(crate) fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Reject empty or blank path arguments before any vault call.
///
/// An empty path would compose a URL that names a different vault endpoint
/// entirely (the root listing), so handlers treat it as a domain error
/// rather than letting the call misroute.
pub(crate) fn non_empty_path(
    tool: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid_arguments(
            tool,
            format!("field '{field}' must be a non-empty path"),
        ));
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
