use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::types::*;
use crate::translator::Principal;

/// The ledger-side collaborator every handler queries.
///
/// One instance is built at startup and shared read-only by all requests.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Chain id as decimal text.
    async fn chain_id(&self) -> Result<String>;

    async fn net_version(&self) -> Result<String>;

    /// Certificate for the head of the block log, `None` while the log is
    /// empty.
    async fn tip_certificate(&self) -> Result<Option<DataCertificate>>;

    async fn get_blocks(&self, args: GetBlocksArgs) -> Result<GetBlocksResult>;

    async fn get_currency_pairs(&self) -> Result<Vec<CurrencyPair>>;

    async fn mint_tokens(&self, operation: &MintOperation) -> Result<ExchangeReply>;

    async fn burn_tokens(&self, operation: &BurnOperation) -> Result<ExchangeReply>;
}

/// Ledger client speaking JSON-RPC to a ledger gateway.
///
/// Block-log calls are addressed to the logger canister, exchange calls to
/// the dex canister.
#[derive(Clone)]
pub struct HttpLedgerClient {
    http_client: Client,
    rpc_url: String,
    logger_canister: Principal,
    dex_canister: Principal,
}

impl HttpLedgerClient {
    pub fn new(
        rpc_url: &str,
        logger_canister: Principal,
        dex_canister: Principal,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build ledger HTTP client")?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.to_string(),
            logger_canister,
            dex_canister,
        })
    }

    /// Send a JSON-RPC request to the gateway and return its `result`.
    async fn send_request(&self, request: &LedgerRpcRequest) -> Result<serde_json::Value> {
        debug!("Sending ledger RPC request: method={}", request.method);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(request)
            .send()
            .await
            .context("Failed to send request to ledger gateway")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Ledger gateway returned HTTP {}: {}", status, body);
            return Err(anyhow!("Ledger gateway HTTP error: {} - {}", status, body));
        }

        let rpc_response: LedgerRpcResponse = response
            .json()
            .await
            .context("Failed to parse ledger gateway response")?;

        if let Some(err) = rpc_response.error {
            error!("Ledger RPC error: code={}, message={}", err.code, err.message);
            return Err(anyhow!("Ledger RPC error {}: {}", err.code, err.message));
        }

        Ok(rpc_response.result)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        canister: &Principal,
        method: &str,
        args: serde_json::Value,
    ) -> Result<T> {
        let params = serde_json::json!({
            "canisterId": canister.to_text(),
            "args": args,
        });
        let request = LedgerRpcRequest::new(method, Some(params));
        let result = self.send_request(&request).await?;
        serde_json::from_value(result).with_context(|| format!("Failed to parse {method} response"))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn chain_id(&self) -> Result<String> {
        self.call(&self.logger_canister, "chain_id", serde_json::Value::Null)
            .await
    }

    async fn net_version(&self) -> Result<String> {
        self.call(&self.logger_canister, "net_version", serde_json::Value::Null)
            .await
    }

    async fn tip_certificate(&self) -> Result<Option<DataCertificate>> {
        self.call(
            &self.logger_canister,
            "icrc3_get_tip_certificate",
            serde_json::Value::Null,
        )
        .await
    }

    async fn get_blocks(&self, args: GetBlocksArgs) -> Result<GetBlocksResult> {
        let args = serde_json::to_value(args).context("Failed to serialize get_blocks args")?;
        self.call(&self.logger_canister, "icrc3_get_blocks", args)
            .await
    }

    async fn get_currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        self.call(&self.dex_canister, "get_currency_pairs", serde_json::Value::Null)
            .await
    }

    async fn mint_tokens(&self, operation: &MintOperation) -> Result<ExchangeReply> {
        let args = serde_json::to_value(operation).context("Failed to serialize mint operation")?;
        self.call(&self.dex_canister, "mint_tokens", args).await
    }

    async fn burn_tokens(&self, operation: &BurnOperation) -> Result<ExchangeReply> {
        let args = serde_json::to_value(operation).context("Failed to serialize burn operation")?;
        self.call(&self.dex_canister, "burn_tokens", args).await
    }
}
