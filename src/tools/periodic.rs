//! Periodic note tools.

use std::sync::Arc;

use serde_json::json;

use super::pretty_json;
use crate::mcp::errors::ToolError;
use crate::mcp::registry::{HandlerFuture, ToolArgs, ToolDefinition};
use crate::mcp::ContentBlock;
use crate::vault::VaultClient;

/// Period names the vault's periodic-note interface understands.
const PERIODS: [&str; 5] = ["daily", "weekly", "monthly", "quarterly", "yearly"];

/// Defaults and cap for recent periodic note lookups.
const DEFAULT_RECENT_LIMIT: u32 = 5;
const MAX_RECENT_LIMIT: u32 = 50;

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "periodic_note",
            description: "Returns the content of the current periodic note for the given period.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "period": {
                        "type": "string",
                        "description": "The period type: daily, weekly, monthly, quarterly, or yearly",
                        "enum": ["daily", "weekly", "monthly", "quarterly", "yearly"]
                    }
                },
                "required": ["period"]
            }),
            read_retry: true,
            handler: periodic_note_handler,
        },
        ToolDefinition {
            name: "recent_periodic_notes",
            description: "Returns the most recent periodic notes for the given period.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "period": {
                        "type": "string",
                        "description": "The period type: daily, weekly, monthly, quarterly, or yearly",
                        "enum": ["daily", "weekly", "monthly", "quarterly", "yearly"]
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of notes to return (default: 5, max: 50)"
                    },
                    "include_content": {
                        "type": "boolean",
                        "description": "Whether to include note content in the results (default: false)"
                    }
                },
                "required": ["period"]
            }),
            read_retry: true,
            handler: recent_periodic_notes_handler,
        },
    ]
}

// ─── Handlers ────────────────────────────────────────────────────────────────

fn periodic_note_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let period = args.required_str("period")?;
        validate_period("periodic_note", period)?;
        let content = vault.periodic_note(period).await?;
        Ok(vec![ContentBlock::text(content)])
    })
}

fn recent_periodic_notes_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let period = args.required_str("period")?;
        validate_period("recent_periodic_notes", period)?;
        let limit = args
            .positive_u32_or("limit", DEFAULT_RECENT_LIMIT)?
            .min(MAX_RECENT_LIMIT);
        let include_content = args.bool_or("include_content", false)?;
        let results = vault
            .recent_periodic_notes(period, limit, include_content)
            .await?;
        Ok(vec![ContentBlock::text(pretty_json(&results))])
    })
}

fn validate_period(tool: &'static str, period: &str) -> Result<(), ToolError> {
    if PERIODS.contains(&period) {
        Ok(())
    } else {
        Err(ToolError::invalid_arguments(
            tool,
            format!("period must be one of: {}", PERIODS.join(", ")),
        ))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
