//! Exchange methods. These reach the dex collaborator rather than the
//! block log.

use anyhow::anyhow;
use serde_json::Value;
use tracing::{debug, info};

use super::params::{BurnRequest, MintRequest};
use crate::error::RpcError;
use crate::ledger::client::LedgerClient;
use crate::ledger::types::ExchangeReply;

/// Handler for eth_getCurrencyPairs
pub async fn get_currency_pairs(client: &dyn LedgerClient) -> Result<Value, RpcError> {
    let pairs = client
        .get_currency_pairs()
        .await
        .map_err(|e| RpcError::collaborator("get currency pairs", e))?;
    debug!("eth_getCurrencyPairs -> {} pairs", pairs.len());
    serde_json::to_value(pairs).map_err(RpcError::Encode)
}

/// Handler for eth_mintTokens
pub async fn mint_tokens(client: &dyn LedgerClient, request: MintRequest) -> Result<Value, RpcError> {
    let operation = request.into_operation()?;
    info!(
        "eth_mintTokens: {} {} to {}",
        operation.amount, operation.currency, operation.recipient
    );

    let reply = client
        .mint_tokens(&operation)
        .await
        .map_err(|e| RpcError::collaborator("mint tokens", e))?;
    settle("mint tokens", reply)
}

/// Handler for eth_burnTokens
pub async fn burn_tokens(client: &dyn LedgerClient, request: BurnRequest) -> Result<Value, RpcError> {
    let operation = request.into_operation()?;
    info!(
        "eth_burnTokens: {} {} from {}",
        operation.amount, operation.currency, operation.owner
    );

    let reply = client
        .burn_tokens(&operation)
        .await
        .map_err(|e| RpcError::collaborator("burn tokens", e))?;
    settle("burn tokens", reply)
}

fn settle(operation: &'static str, reply: ExchangeReply) -> Result<Value, RpcError> {
    match reply {
        ExchangeReply::Ok => Ok(Value::Bool(true)),
        ExchangeReply::Err(message) => Err(RpcError::collaborator(operation, anyhow!(message))),
    }
}
