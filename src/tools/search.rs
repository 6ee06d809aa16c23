//! Search tools.
//!
//! Three entry points into the vault's search interfaces: plain text with
//! context, JsonLogic structured queries, and a Dataview DQL query canned
//! for "what changed recently".

use std::sync::Arc;

use serde_json::json;

use super::pretty_json;
use crate::mcp::registry::{HandlerFuture, ToolArgs, ToolDefinition};
use crate::mcp::ContentBlock;
use crate::vault::VaultClient;

/// Context returned around each match when the caller does not choose.
const DEFAULT_CONTEXT_LENGTH: u32 = 100;

/// Defaults and cap for the recent-changes query.
const DEFAULT_RECENT_LIMIT: u32 = 10;
const MAX_RECENT_LIMIT: u32 = 100;
const DEFAULT_RECENT_DAYS: u32 = 90;

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "search_notes",
            description: "Searches for notes matching a text query and returns matches with surrounding context.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Text to search for"
                    },
                    "context_length": {
                        "type": "integer",
                        "description": "How much context to return around each match (default: 100)"
                    }
                },
                "required": ["query"]
            }),
            read_retry: true,
            handler: search_notes_handler,
        },
        ToolDefinition {
            name: "complex_search",
            description: "Searches for notes using a JsonLogic query. Supports glob and regexp matching against note paths.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "object",
                        "description": "JsonLogic query object. Example: {\"glob\": [\"*.md\", {\"var\": \"path\"}]} matches all markdown notes"
                    }
                },
                "required": ["query"]
            }),
            read_retry: true,
            handler: complex_search_handler,
        },
        ToolDefinition {
            name: "recent_changes",
            description: "Returns recently modified notes, newest first.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of notes to return (default: 10, max: 100)"
                    },
                    "days": {
                        "type": "integer",
                        "description": "Only include notes modified within this many days (default: 90)"
                    }
                },
                "required": []
            }),
            read_retry: true,
            handler: recent_changes_handler,
        },
    ]
}

// ─── Handlers ────────────────────────────────────────────────────────────────

fn search_notes_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let query = args.required_str("query")?;
        let context_length = args.u32_or("context_length", DEFAULT_CONTEXT_LENGTH)?;
        let results = vault.search_simple(query, context_length).await?;
        Ok(vec![ContentBlock::text(pretty_json(&results))])
    })
}

fn complex_search_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let query = args.required_object("query")?.clone();
        let results = vault.search_jsonlogic(&query).await?;
        Ok(vec![ContentBlock::text(pretty_json(&results))])
    })
}

fn recent_changes_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let limit = args
            .positive_u32_or("limit", DEFAULT_RECENT_LIMIT)?
            .min(MAX_RECENT_LIMIT);
        let days = args.positive_u32_or("days", DEFAULT_RECENT_DAYS)?;
        let results = vault.search_dql(&recent_changes_query(limit, days)).await?;
        Ok(vec![ContentBlock::text(pretty_json(&results))])
    })
}

/// Dataview DQL query listing notes modified in the last `days` days.
fn recent_changes_query(limit: u32, days: u32) -> String {
    format!(
        "TABLE file.mtime\n\
         WHERE file.mtime >= date(today) - dur({days} days)\n\
         SORT file.mtime DESC\n\
         LIMIT {limit}"
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
