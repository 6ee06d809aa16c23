//! vault-bridge — exposes a local note vault's REST API as MCP tools.
//!
//! The crate is a thin protocol bridge with four layers:
//! - [`config`] — environment-driven startup configuration
//! - [`vault`] — typed HTTP client for the vault's REST API
//! - [`mcp`] — JSON-RPC types, the tool registry, and the dispatcher
//! - [`server`] — the HTTP front door
//!
//! Tool definitions live in [`tools`], one module per family.

pub mod config;
pub mod mcp;
pub mod server;
pub mod tools;
pub mod vault;

/// Initialize the tracing subscriber — structured logs on stderr.
///
/// `RUST_LOG` controls verbosity. Without it, bridge events log at info and
/// everything else at warn.
pub fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vault_bridge=info,warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
