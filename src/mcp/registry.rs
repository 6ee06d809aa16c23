//! Tool registry.
//!
//! Fixed at startup: every tool registers its name, input schema, retry
//! class, and handler exactly once. Lookup and schema validation both run
//! against this table, so a tool that lists is a tool that dispatches.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Value};

use super::errors::ToolError;
use super::types::ContentBlock;
use crate::vault::VaultClient;

/// Boxed future produced by a tool handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Vec<ContentBlock>, ToolError>> + Send>>;

/// Tool entry point. Receives the shared vault client and validated
/// arguments.
pub type ToolHandler = fn(Arc<VaultClient>, ToolArgs) -> HandlerFuture;

// ─── Tool Definition ─────────────────────────────────────────────────────────

/// One registered tool: schema, retry class, and handler.
#[derive(Debug)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema for the tool's arguments.
    pub input_schema: Value,
    /// Whether a transport failure may be replayed once. Only read-only
    /// tools that issue a single vault call set this.
    pub read_retry: bool,
    pub handler: ToolHandler,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Name-to-definition table, fixed after startup.
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolDefinition>,
    /// Registration order, so tool listings stay stable across runs.
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. A name collision is a startup fault, not a runtime
    /// condition, and aborts registry construction.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), ToolError> {
        if self.tools.contains_key(definition.name) {
            return Err(ToolError::DuplicateTool {
                name: definition.name,
            });
        }
        self.order.push(definition.name);
        self.tools.insert(definition.name, definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All definitions, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }

    /// Tool listing in MCP wire shape.
    pub fn listing(&self) -> Value {
        let tools: Vec<Value> = self
            .definitions()
            .map(|definition| {
                json!({
                    "name": definition.name,
                    "description": definition.description,
                    "inputSchema": definition.input_schema,
                })
            })
            .collect();
        Value::Array(tools)
    }

    /// Resolve a tool and validate arguments against its schema.
    ///
    /// This is the single validation point: handlers receive arguments that
    /// already passed the required-field and type checks declared in the
    /// tool's schema.
    pub fn validate_call(
        &self,
        name: &str,
        arguments: &Value,
    ) -> Result<&ToolDefinition, ToolError> {
        let definition = self.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        let Some(provided) = arguments.as_object() else {
            return Err(ToolError::invalid_arguments(
                name,
                "arguments must be a JSON object",
            ));
        };

        let schema = &definition.input_schema;
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for field in required.iter().filter_map(Value::as_str) {
                if !provided.contains_key(field) || provided[field].is_null() {
                    return Err(ToolError::invalid_arguments(
                        name,
                        format!("missing required field: '{field}'"),
                    ));
                }
            }
        }

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (field, value) in provided {
                let Some(expected) = properties
                    .get(field)
                    .and_then(|property| property.get("type"))
                    .and_then(Value::as_str)
                else {
                    continue;
                };
                if !value.is_null() && !value_matches_type(expected, value) {
                    return Err(ToolError::invalid_arguments(
                        name,
                        format!("field '{field}' must be of type {expected}"),
                    ));
                }
            }
        }

        Ok(definition)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a JSON value against a schema type name.
fn value_matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

// ─── Tool Arguments ──────────────────────────────────────────────────────────

/// Validated arguments handed to a tool handler.
///
/// Accessors still return errors rather than panic: schema validation covers
/// declared fields, and handlers must stay total regardless.
pub struct ToolArgs {
    tool: &'static str,
    value: Value,
}

impl ToolArgs {
    pub fn new(tool: &'static str, value: Value) -> Self {
        Self { tool, value }
    }

    pub fn required_str(&self, field: &str) -> Result<&str, ToolError> {
        self.value
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ToolError::invalid_arguments(self.tool, format!("missing required field: '{field}'"))
            })
    }

    pub fn opt_str(&self, field: &str) -> Option<&str> {
        self.value.get(field).and_then(Value::as_str)
    }

    pub fn u32_or(&self, field: &str, default: u32) -> Result<u32, ToolError> {
        match self.value.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    ToolError::invalid_arguments(
                        self.tool,
                        format!("field '{field}' must be a non-negative integer"),
                    )
                }),
        }
    }

    /// Like [`u32_or`](Self::u32_or), but rejects zero. For bounds where
    /// zero means "nothing", which no caller asks for on purpose.
    pub fn positive_u32_or(&self, field: &str, default: u32) -> Result<u32, ToolError> {
        let value = self.u32_or(field, default)?;
        if value == 0 {
            return Err(ToolError::invalid_arguments(
                self.tool,
                format!("field '{field}' must be a positive integer"),
            ));
        }
        Ok(value)
    }

    pub fn bool_or(&self, field: &str, default: bool) -> Result<bool, ToolError> {
        match self.value.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| {
                ToolError::invalid_arguments(self.tool, format!("field '{field}' must be a boolean"))
            }),
        }
    }

    pub fn str_array(&self, field: &str) -> Result<Vec<String>, ToolError> {
        let items = self
            .value
            .get(field)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ToolError::invalid_arguments(self.tool, format!("missing required field: '{field}'"))
            })?;

        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ToolError::invalid_arguments(
                        self.tool,
                        format!("field '{field}' must be an array of strings"),
                    )
                })
            })
            .collect()
    }

    pub fn required_object(&self, field: &str) -> Result<&Value, ToolError> {
        let value = self.value.get(field).ok_or_else(|| {
            ToolError::invalid_arguments(self.tool, format!("missing required field: '{field}'"))
        })?;
        if !value.is_object() {
            return Err(ToolError::invalid_arguments(
                self.tool,
                format!("field '{field}' must be a JSON object"),
            ));
        }
        Ok(value)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
