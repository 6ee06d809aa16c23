//! MCP protocol layer.
//!
//! This module owns everything between the HTTP front door and the vault
//! client:
//! - JSON-RPC 2.0 envelopes and tool-result wire types
//! - The startup-fixed tool registry with schema validation
//! - The dispatcher that validates, executes, and packages tool calls

pub mod dispatcher;
pub mod errors;
pub mod registry;
pub mod types;

pub use dispatcher::Dispatcher;
pub use errors::ToolError;
pub use registry::{HandlerFuture, ToolArgs, ToolDefinition, ToolHandler, ToolRegistry};
pub use types::{ContentBlock, JsonRpcRequest, JsonRpcResponse, ToolResult, PROTOCOL_VERSION};
