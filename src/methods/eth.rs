use anyhow::anyhow;
use num_bigint::BigUint;
use serde_json::{json, Value};
use tracing::debug;

use super::params::{BlockByHashParams, BlockByNumberParams, LogFilter};
use crate::emulator::block::{map_ledger_block, resolve_block_tag};
use crate::emulator::hash::extract_block_hash;
use crate::emulator::logs;
use crate::error::RpcError;
use crate::ledger::client::LedgerClient;
use crate::ledger::types::{GetBlocksArgs, Value as LedgerValue};
use crate::translator::certificate::decode_certificate_height;

/// Height of the newest block, read from the tip certificate.
pub async fn current_tip(client: &dyn LedgerClient) -> Result<u64, RpcError> {
    let certificate = client
        .tip_certificate()
        .await
        .map_err(|e| RpcError::collaborator("get tip certificate", e))?
        .ok_or_else(|| RpcError::NotFound("no tip certificate found".to_string()))?;

    Ok(decode_certificate_height(&certificate.certificate)?)
}

/// Fetch the raw ledger record of a single block.
async fn fetch_block(client: &dyn LedgerClient, number: u64) -> Result<LedgerValue, RpcError> {
    let result = client
        .get_blocks(GetBlocksArgs {
            start: number,
            length: 1,
        })
        .await
        .map_err(|e| RpcError::collaborator("get blocks", e))?;

    let wanted = BigUint::from(number);
    result
        .blocks
        .into_iter()
        .find(|b| b.id == wanted)
        .map(|b| b.block)
        .ok_or_else(|| RpcError::NotFound(format!("block {} not found", number)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(RpcError::Encode)
}

/// Handler for eth_chainId
pub async fn chain_id(client: &dyn LedgerClient) -> Result<Value, RpcError> {
    let decimal = client
        .chain_id()
        .await
        .map_err(|e| RpcError::collaborator("get chain id", e))?;

    let id = BigUint::parse_bytes(decimal.trim().as_bytes(), 10).ok_or_else(|| {
        RpcError::collaborator("get chain id", anyhow!("not a decimal number: {}", decimal))
    })?;

    let hex = format!("0x{}", id.to_str_radix(16));
    debug!("eth_chainId -> {} ({})", hex, decimal);
    Ok(Value::String(hex))
}

/// Handler for eth_blockNumber
pub async fn block_number(client: &dyn LedgerClient) -> Result<Value, RpcError> {
    let tip = current_tip(client).await?;
    let hex = format!("0x{:x}", tip);
    debug!("eth_blockNumber -> {} (block {})", hex, tip);
    Ok(Value::String(hex))
}

/// Handler for eth_getBlockByNumber
pub async fn get_block_by_number(
    client: &dyn LedgerClient,
    params: BlockByNumberParams,
) -> Result<Value, RpcError> {
    let tip = current_tip(client).await?;
    let number = resolve_block_tag(&params.block, tip)?;

    debug!(
        "eth_getBlockByNumber: param={}, target={}, tip={}",
        params.block, number, tip
    );

    let block = fetch_block(client, number).await?;
    to_json(&map_ledger_block(&block)?)
}

/// Handler for eth_getBlockByHash
///
/// Hashes are not indexed, so this walks down from the tip one block at a
/// time until the hash matches or block 0 has been checked.
pub async fn get_block_by_hash(
    client: &dyn LedgerClient,
    params: BlockByHashParams,
) -> Result<Value, RpcError> {
    let tip = current_tip(client).await?;
    debug!("eth_getBlockByHash: hash={}, scanning from {}", params.hash, tip);

    for number in (0..=tip).rev() {
        let block = fetch_block(client, number).await?;
        if extract_block_hash(&block)?.eq_ignore_ascii_case(&params.hash) {
            debug!("eth_getBlockByHash: {} is block {}", params.hash, number);
            return to_json(&map_ledger_block(&block)?);
        }
    }

    Err(RpcError::NotFound(format!(
        "block with hash {} not found",
        params.hash
    )))
}

/// Handler for eth_getLogs
pub async fn get_logs(
    client: &dyn LedgerClient,
    filter: LogFilter,
    batch_size: u64,
) -> Result<Value, RpcError> {
    let tip = current_tip(client).await?;
    let query = filter.to_query(tip)?;

    debug!(
        "eth_getLogs: from={}, to={}, address={:?}, blockHash={:?}, tip={}",
        query.from_block, query.to_block, query.address, query.block_hash, tip
    );

    let logs = logs::get_logs(client, &query, tip, batch_size).await?;
    debug!("eth_getLogs: {} logs", logs.len());
    to_json(&logs)
}

/// Handler for eth_accounts
/// The adapter manages no keys.
pub async fn accounts() -> Result<Value, RpcError> {
    Ok(json!([]))
}
