//! EVM Adapter
//!
//! Entry point for the adapter that serves Ethereum JSON-RPC from an ICRC-3
//! block log ledger. Loads configuration from environment/.env file, builds
//! the ledger client once and starts the JSON-RPC server on the configured
//! port.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use evm_adapter::config::Config;
use evm_adapter::ledger::HttpLedgerClient;
use evm_adapter::server::start_server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    info!("=== EVM Adapter ===");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  RPC Port: {}", config.port);
    info!("  Ledger timeout: {:?}", config.ledger_timeout);
    info!("  getLogs batch size: {}", config.logs_batch_size);
    info!("  Log level: {}", config.log_level);

    // Built exactly once; a failure here ends the process.
    let client = HttpLedgerClient::new(
        &config.ledger_rpc_url,
        config.logger_canister_id.clone(),
        config.dex_canister_id.clone(),
        config.ledger_timeout,
    )
    .context("Failed to construct ledger client")?;

    start_server(config, Arc::new(client)).await?;

    Ok(())
}
