use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use vault_bridge::config::BridgeConfig;
use vault_bridge::mcp::Dispatcher;
use vault_bridge::server::{self, AppState};
use vault_bridge::tools;
use vault_bridge::vault::VaultClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vault_bridge::init_tracing();

    let config = BridgeConfig::from_env().context("failed to load configuration")?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        vault = %config.vault.base_url(),
        listen_port = config.listen_port,
        pid = std::process::id(),
        "=== vault-bridge starting ==="
    );

    let vault =
        Arc::new(VaultClient::new(&config.vault).context("failed to build vault client")?);
    let registry = tools::build_registry().context("failed to register tools")?;
    tracing::info!(tool_count = registry.len(), "tool registry built");

    let state = Arc::new(AppState {
        dispatcher: Dispatcher::new(registry, vault),
    });

    let listener = TcpListener::bind(("0.0.0.0", config.listen_port))
        .await
        .with_context(|| format!("failed to bind port {}", config.listen_port))?;
    tracing::info!(port = config.listen_port, "listening");

    server::serve(listener, state)
        .await
        .context("server terminated abnormally")?;
    Ok(())
}
