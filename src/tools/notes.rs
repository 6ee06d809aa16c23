//! Listing and reading tools.
//!
//! All four tools here are read-only. The single-call ones are marked for
//! the dispatcher's transport replay; the batch reader is not, since a
//! replay would repeat reads that already succeeded.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{non_empty_path, pretty_json};
use crate::mcp::registry::{HandlerFuture, ToolArgs, ToolDefinition};
use crate::mcp::ContentBlock;
use crate::vault::VaultClient;

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_notes",
            description: "Lists all files and directories in the root of the vault.",
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            read_retry: true,
            handler: list_notes_handler,
        },
        ToolDefinition {
            name: "list_dir",
            description: "Lists all files and directories in a specific vault directory.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dirpath": {
                        "type": "string",
                        "description": "Directory to list, relative to the vault root"
                    }
                },
                "required": ["dirpath"]
            }),
            read_retry: true,
            handler: list_dir_handler,
        },
        ToolDefinition {
            name: "read_note",
            description: "Returns the content of a single note in the vault.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the note, relative to the vault root"
                    }
                },
                "required": ["path"]
            }),
            read_retry: true,
            handler: read_note_handler,
        },
        ToolDefinition {
            name: "read_notes",
            description: "Returns the contents of multiple notes, concatenated with per-note headers.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "paths": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Paths to the notes, relative to the vault root"
                    }
                },
                "required": ["paths"]
            }),
            read_retry: false,
            handler: read_notes_handler,
        },
    ]
}

// ─── Handlers ────────────────────────────────────────────────────────────────

fn list_notes_handler(vault: Arc<VaultClient>, _args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let listing = vault.list_root().await?;
        Ok(vec![ContentBlock::text(pretty_json(&Value::from(
            listing.files,
        )))])
    })
}

fn list_dir_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let dirpath = args.required_str("dirpath")?;
        non_empty_path("list_dir", "dirpath", dirpath)?;
        let listing = vault.list_dir(dirpath).await?;
        Ok(vec![ContentBlock::text(pretty_json(&Value::from(
            listing.files,
        )))])
    })
}

fn read_note_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let path = args.required_str("path")?;
        non_empty_path("read_note", "path", path)?;
        let content = vault.read_note(path).await?;
        Ok(vec![ContentBlock::text(content)])
    })
}

/// Reads each note in turn. A failed read becomes an inline error section
/// rather than failing the whole batch; an empty path entry rejects the
/// batch up front, before any vault call.
fn read_notes_handler(vault: Arc<VaultClient>, args: ToolArgs) -> HandlerFuture {
    Box::pin(async move {
        let paths = args.str_array("paths")?;
        for path in &paths {
            non_empty_path("read_notes", "paths", path)?;
        }
        let mut combined = String::new();
        for path in &paths {
            match vault.read_note(path).await {
                Ok(content) => combined.push_str(&note_section(path, &content)),
                Err(e) => {
                    combined.push_str(&note_section(path, &format!("Error reading note: {e}")))
                }
            }
        }
        Ok(vec![ContentBlock::text(combined)])
    })
}

fn note_section(path: &str, body: &str) -> String {
    format!("# {path}\n\n{body}\n\n---\n\n")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
