//! Mutation tools: write, append, patch, delete.
//!
//! None of these are replayed on failure. A transport failure after a write
//! leaves the vault's state unknown, and the caller decides what to do next.

use std::sync::Arc;

use serde_json::json;

use super::non_empty_path;
use crate::mcp::errors::ToolError;
use crate::mcp::registry::{HandlerFuture, ToolArgs, ToolDefinition};
use crate::mcp::ContentBlock;
use crate::vault::VaultClient;

/// Operations the vault's patch interface accepts.
const PATCH_OPERATIONS: [&str; 3] = ["append", "prepend", "replace"];

/// Targets a patch can be anchored to.
const TARGET_TYPES: [&str; 3] = ["heading", "block", "frontmatter"];

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "write_note",
            description: "Creates a new note or overwrites an existing one with the provided content.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the note, relative to the vault root"
                    },
                    "content": {
                        "type": "string",
                        "description": "Full content of the note"
                    }
                },
                "required": ["path", "content"]
            }),
            read_retry: false,
            handler: write_note_handler,
        },
        ToolDefinition {
            name: "append_note",
            description: "Appends content to a new or existing note in the vault.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the note, relative to the vault root"
                    },
                    "content": {
                        "type": "string",
                        "description": "Content to append to the note"
                    }
                },
                "required": ["path", "content"]
            }),
            read_retry: false,
            handler: append_note_handler,
        },
        ToolDefinition {
            name: "patch_note",
            description: "Inserts or modifies content in an existing note, optionally relative to a heading, block reference, or frontmatter field.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the note, relative to the vault root"
                    },
                    "operation": {
                        "type": "string",
                        "description": "How to apply the content",
                        "enum": ["append", "prepend", "replace"]
                    },
                    "target_type": {
                        "type": "string",
                        "description": "Kind of anchor to patch relative to",
                        "enum": ["heading", "block", "frontmatter"]
                    },
                    "target": {
                        "type": "string",
                        "description": "Anchor identifier, such as a heading path or block reference"
                    },
                    "content": {
                        "type": "string",
                        "description": "Content to insert"
                    }
                },
                "required": ["path", "operation", "content"]
            }),
            read_retry: false,
            handler: patch_note_handler,
        },
        ToolDefinition {
            name: "delete_note",
            description: "Permanently deletes a note from the vault.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the note to delete, relative to the vault root"
                    }
                },
                "required": ["path"]
            }),
            read_retry: false,
            handler: delete_note_handler,
        },
    ]
}

// ─── Handlers ────────────────────────────────────────────────────────────────

fn write_note_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let path = args.required_str("path")?;
        non_empty_path("write_note", "path", path)?;
        let content = args.required_str("content")?;
        vault.put_note(path, content).await?;
        Ok(vec![ContentBlock::text(format!(
            "Successfully wrote content to {path}"
        ))])
    })
}

fn append_note_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let path = args.required_str("path")?;
        non_empty_path("append_note", "path", path)?;
        let content = args.required_str("content")?;
        vault.append_note(path, content).await?;
        Ok(vec![ContentBlock::text(format!(
            "Successfully appended content to {path}"
        ))])
    })
}

fn patch_note_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let path = args.required_str("path")?;
        non_empty_path("patch_note", "path", path)?;
        let operation = args.required_str("operation")?;
        let content = args.required_str("content")?;
        let target_type = args.opt_str("target_type");
        let target = args.opt_str("target");

        if !PATCH_OPERATIONS.contains(&operation) {
            return Err(ToolError::invalid_arguments(
                "patch_note",
                format!(
                    "operation must be one of: {}",
                    PATCH_OPERATIONS.join(", ")
                ),
            ));
        }
        if let Some(target_type) = target_type {
            if !TARGET_TYPES.contains(&target_type) {
                return Err(ToolError::invalid_arguments(
                    "patch_note",
                    format!("target_type must be one of: {}", TARGET_TYPES.join(", ")),
                ));
            }
        }
        // The vault needs both headers to anchor a patch.
        if target_type.is_some() != target.is_some() {
            return Err(ToolError::invalid_arguments(
                "patch_note",
                "fields 'target_type' and 'target' must be provided together",
            ));
        }

        vault
            .patch_note(path, operation, target_type, target, content)
            .await?;
        Ok(vec![ContentBlock::text(format!(
            "Successfully patched content in {path}"
        ))])
    })
}

fn delete_note_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let path = args.required_str("path")?;
        non_empty_path("delete_note", "path", path)?;
        vault.delete_note(path).await?;
        Ok(vec![ContentBlock::text(format!(
            "Successfully deleted {path}"
        ))])
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
