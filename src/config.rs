use std::collections::HashSet;
use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::dispatch::{DispatchOptions, RpcMethod, DEFAULT_LOGS_BATCH_SIZE};
use crate::translator::Principal;

/// EVM adapter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ledger gateway JSON-RPC endpoint
    pub ledger_rpc_url: String,
    /// Principal of the block log ledger
    pub logger_canister_id: Principal,
    /// Principal of the exchange
    pub dex_canister_id: Principal,
    pub ledger_timeout: Duration,
    /// RPC server port
    pub port: u16,
    /// Blocks fetched per ledger call in eth_getLogs
    pub logs_batch_size: u64,
    /// Methods whose response is wrapped in a one-element array
    pub array_response_methods: HashSet<RpcMethod>,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Call dotenvy::dotenv() before calling this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let ledger_rpc_url = var("LEDGER_RPC_URL", "http://127.0.0.1:4943/api/ledger");
        if ledger_rpc_url.trim().is_empty() {
            bail!("LEDGER_RPC_URL must not be empty");
        }

        let logger_canister_id = required_principal(&lookup, "LOGGER_CANISTER_ID")?;
        let dex_canister_id = required_principal(&lookup, "DEX_CANISTER_ID")?;

        let timeout_secs: u64 = var("LEDGER_TIMEOUT_SECS", "30")
            .parse()
            .context("LEDGER_TIMEOUT_SECS must be a valid u64")?;

        let port: u16 = var("EVM_ADAPTER_PORT", "8545")
            .parse()
            .context("EVM_ADAPTER_PORT must be a valid u16")?;

        let logs_batch_size: u64 = var("LOGS_BATCH_SIZE", &DEFAULT_LOGS_BATCH_SIZE.to_string())
            .parse()
            .context("LOGS_BATCH_SIZE must be a valid u64")?;
        if logs_batch_size == 0 {
            bail!("LOGS_BATCH_SIZE must be at least 1");
        }

        let array_response_methods = var("ARRAY_RESPONSE_METHODS", "net_version")
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                RpcMethod::from_name(name)
                    .ok_or_else(|| anyhow!("ARRAY_RESPONSE_METHODS: unsupported method {}", name))
            })
            .collect::<Result<HashSet<_>>>()?;

        let log_level = var("RUST_LOG", "info");

        Ok(Config {
            ledger_rpc_url,
            logger_canister_id,
            dex_canister_id,
            ledger_timeout: Duration::from_secs(timeout_secs),
            port,
            logs_batch_size,
            array_response_methods,
            log_level,
        })
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            array_response_methods: self.array_response_methods.clone(),
            logs_batch_size: self.logs_batch_size,
        }
    }
}

fn required_principal(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Principal> {
    let text = lookup(key).with_context(|| format!("{} must be set in environment or .env file", key))?;
    Principal::from_text(text.trim()).with_context(|| format!("{} is not a valid principal", key))
}
