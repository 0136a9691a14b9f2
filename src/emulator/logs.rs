use serde::{Deserialize, Serialize};
use tracing::debug;

use super::hash::{extract_block_hash, pseudo_transaction_hash};
use crate::error::RpcError;
use crate::ledger::client::LedgerClient;
use crate::ledger::types::{GetBlocksArgs, Value};
use crate::ledger::value::{LedgerBlock, LogEntry};
use crate::translator::address::{format_eth_address, principal_text_to_eth_address};

/// The single topic every ledger log carries.
pub const ZERO_TOPIC: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// EVM log entry, one per ledger log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmLog {
    /// Address derived from the entry's caller principal
    pub address: String,
    pub topics: Vec<String>,
    /// Hex of the JSON-encoded [`LogData`]
    pub data: String,
    pub block_number: String,
    pub transaction_hash: String,
    pub transaction_index: String,
    pub block_hash: String,
    pub log_index: String,
    pub removed: bool,
}

/// Payload carried in a log's `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogData {
    pub operation: String,
    pub detail: LogDataDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDataDetail {
    pub map: Vec<LogDataField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDataField {
    pub field0: String,
    pub field1: LogDataValue,
}

/// Text and natural details are carried over; other variants leave both
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDataValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat: Option<String>,
}

impl LogData {
    pub fn from_entry(entry: &LogEntry) -> Self {
        let map = entry
            .details
            .as_map()
            .unwrap_or_default()
            .iter()
            .map(|(name, value)| LogDataField {
                field0: name.clone(),
                field1: match value {
                    Value::Text(s) => LogDataValue {
                        text: Some(s.clone()),
                        nat: None,
                    },
                    Value::Nat(n) => LogDataValue {
                        text: None,
                        nat: Some(n.to_string()),
                    },
                    Value::Int(i) => LogDataValue {
                        text: None,
                        nat: Some(i.to_string()),
                    },
                    _ => LogDataValue::default(),
                },
            })
            .collect();

        LogData {
            operation: entry.operation.clone(),
            detail: LogDataDetail { map },
        }
    }
}

/// Filter applied by `eth_getLogs`. Block bounds are already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub from_block: u64,
    pub to_block: u64,
    pub address: Option<String>,
    pub block_hash: Option<String>,
}

/// Turn every entry of one ledger block into an EVM log.
///
/// Entries are decoded before filtering, so a malformed entry fails the
/// whole block even when a filter would have dropped it. The entry's
/// position is both its transaction index and its log index.
pub fn extract_logs_from_block(
    block: &Value,
    address: Option<&str>,
    block_hash: Option<&str>,
) -> Result<Vec<EvmLog>, RpcError> {
    let decoded = LedgerBlock::decode(block)?;
    if decoded.entries.is_empty() {
        return Ok(Vec::new());
    }

    let hash = extract_block_hash(block)?;
    let hash_matches = block_hash.map_or(true, |want| want.eq_ignore_ascii_case(&hash));
    let block_number = format!("0x{}", decoded.id.to_str_radix(16));
    let transaction_hash = pseudo_transaction_hash(block);

    let mut logs = Vec::new();
    for (i, raw_entry) in decoded.entries.iter().enumerate() {
        let entry = LogEntry::decode(raw_entry)?;
        let entry_address = format_eth_address(&principal_text_to_eth_address(&entry.caller)?);

        if !hash_matches || address.is_some_and(|want| !want.eq_ignore_ascii_case(&entry_address)) {
            continue;
        }

        let data = serde_json::to_vec(&LogData::from_entry(&entry)).map_err(RpcError::Encode)?;

        logs.push(EvmLog {
            address: entry_address,
            topics: vec![ZERO_TOPIC.to_string()],
            data: format!("0x{}", hex::encode(data)),
            block_number: block_number.clone(),
            transaction_hash: transaction_hash.clone(),
            transaction_index: format!("0x{:x}", i),
            block_hash: hash.clone(),
            log_index: format!("0x{:x}", i),
            removed: false,
        });
    }

    Ok(logs)
}

/// Collect logs over `[from_block, to_block]`, fetching blocks in batches.
///
/// `to_block` is clamped to `tip` first. Fetching stops after the first
/// batch that returns fewer blocks than were asked for.
pub async fn get_logs(
    client: &dyn LedgerClient,
    query: &LogQuery,
    tip: u64,
    batch_size: u64,
) -> Result<Vec<EvmLog>, RpcError> {
    let to_block = query.to_block.min(tip);
    if query.from_block > to_block {
        return Err(RpcError::Range {
            from: query.from_block,
            to: to_block,
        });
    }

    let batch_size = batch_size.max(1);
    let mut logs = Vec::new();
    let mut start = query.from_block;

    loop {
        let end = start.saturating_add(batch_size - 1).min(to_block);
        let args = GetBlocksArgs {
            start,
            length: end - start + 1,
        };

        let result = client
            .get_blocks(args)
            .await
            .map_err(|e| RpcError::collaborator("get blocks", e))?;

        debug!(
            "eth_getLogs: fetched blocks {}..={} ({} returned)",
            start,
            end,
            result.blocks.len()
        );

        for block in &result.blocks {
            logs.extend(extract_logs_from_block(
                &block.block,
                query.address.as_deref(),
                query.block_hash.as_deref(),
            )?);
        }

        if (result.blocks.len() as u64) < args.length || end >= to_block {
            break;
        }
        start = end + 1;
    }

    Ok(logs)
}
