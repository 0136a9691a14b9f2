use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RpcError;
use crate::ledger::types::Value;
use crate::ledger::value::LedgerBlock;
use crate::translator::address::hex_to_decimal;

/// 32 zero bytes, used for every root the ledger has no equivalent for.
pub const ZERO_ROOT: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
pub const ZERO_NONCE: &str = "0x0000000000000000";
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// EVM-formatted block object.
///
/// Only `number`, `hash`, `parentHash` and `timestamp` come from the ledger
/// block. Every other field is a fixed zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmBlock {
    /// Block number (ledger block id)
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub nonce: String,
    pub sha3_uncles: String,
    /// 256 zero bytes
    pub logs_bloom: String,
    pub transactions_root: String,
    pub state_root: String,
    pub receipts_root: String,
    pub miner: String,
    pub difficulty: String,
    pub total_difficulty: String,
    pub extra_data: String,
    pub size: String,
    pub gas_limit: String,
    pub gas_used: String,
    /// Seconds since the Unix epoch
    pub timestamp: String,
    /// Always empty, log entries stand in for transactions.
    pub transactions: Vec<String>,
    pub uncles: Vec<String>,
}

impl EvmBlock {
    /// Project a decoded ledger block onto the EVM block shape.
    pub fn from_ledger(block: &LedgerBlock) -> Self {
        let number = format!("0x{}", block.id.to_str_radix(16));
        // Truncating division keeps second granularity.
        let timestamp = format!("0x{:x}", block.ts / NANOS_PER_SECOND);

        debug!(
            "Mapped ledger block: number={}, timestamp={}, entries={}",
            number,
            timestamp,
            block.entries.len()
        );

        EvmBlock {
            number,
            hash: format!("0x{}", hex::encode(&block.hash)),
            parent_hash: format!("0x{}", hex::encode(&block.parent_hash)),
            nonce: ZERO_NONCE.to_string(),
            sha3_uncles: String::new(),
            logs_bloom: format!("0x{}", "0".repeat(512)),
            transactions_root: ZERO_ROOT.to_string(),
            state_root: ZERO_ROOT.to_string(),
            receipts_root: ZERO_ROOT.to_string(),
            miner: ZERO_ADDRESS.to_string(),
            difficulty: "0x0".to_string(),
            total_difficulty: "0x0".to_string(),
            extra_data: "0x".to_string(),
            size: "0x0".to_string(),
            gas_limit: "0x0".to_string(),
            gas_used: "0x0".to_string(),
            timestamp,
            transactions: Vec::new(),
            uncles: Vec::new(),
        }
    }
}

/// Decode a raw ledger block and map it to an EVM block.
pub fn map_ledger_block(value: &Value) -> Result<EvmBlock, RpcError> {
    let block = LedgerBlock::decode(value)?;
    Ok(EvmBlock::from_ledger(&block))
}

/// Resolve an EVM block parameter against the current tip.
/// `latest`, `safe`, `finalized` and `pending` all mean the tip; `earliest`
/// is block 0. Anything else must be a hex number.
pub fn resolve_block_tag(block_param: &str, tip: u64) -> Result<u64, RpcError> {
    match hex_to_decimal(block_param)?.as_str() {
        "latest" | "safe" | "finalized" | "pending" => Ok(tip),
        "earliest" => Ok(0),
        decimal => decimal
            .parse()
            .map_err(|_| RpcError::invalid_params("block number", block_param)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal_block() -> Value {
        Value::map([
            ("id", Value::nat(1)),
            ("hash", Value::Blob(vec![1, 2, 3, 4])),
            ("phash", Value::Blob(vec![5, 6, 7, 8])),
            ("ts", Value::nat(1_000_000_000)),
        ])
    }

    #[test]
    fn test_map_minimal_block() {
        let block = map_ledger_block(&minimal_block()).unwrap();
        assert_eq!(block.number, "0x1");
        assert_eq!(block.hash, "0x01020304");
        assert_eq!(block.parent_hash, "0x05060708");
        assert_eq!(block.timestamp, "0x1");
        assert!(block.transactions.is_empty());
    }

    #[test]
    fn test_timestamp_truncates_to_seconds() {
        let value = Value::map([("ts", Value::nat(2_999_999_999))]);
        assert_eq!(map_ledger_block(&value).unwrap().timestamp, "0x2");
    }

    #[test]
    fn test_placeholder_fields() {
        let block = map_ledger_block(&minimal_block()).unwrap();
        assert_eq!(block.nonce, "0x0000000000000000");
        assert_eq!(block.logs_bloom.len(), 2 + 512);
        assert_eq!(block.transactions_root, ZERO_ROOT);
        assert_eq!(block.miner.len(), 42);
        assert_eq!(block.difficulty, "0x0");
        assert_eq!(block.extra_data, "0x");
        assert_eq!(block.sha3_uncles, "");
        assert!(block.uncles.is_empty());
    }

    #[test]
    fn test_map_requires_map_value() {
        let err = map_ledger_block(&Value::nat(1)).unwrap_err();
        assert!(err.to_string().contains("expected Map value"));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(map_ledger_block(&minimal_block()).unwrap()).unwrap();
        assert_eq!(json["parentHash"], "0x05060708");
        assert_eq!(json["totalDifficulty"], "0x0");
        assert_eq!(json["transactions"], serde_json::json!([]));
    }

    #[test]
    fn test_resolve_block_tag() {
        assert_eq!(resolve_block_tag("latest", 1000).unwrap(), 1000);
        assert_eq!(resolve_block_tag("finalized", 1000).unwrap(), 1000);
        assert_eq!(resolve_block_tag("pending", 1000).unwrap(), 1000);
        assert_eq!(resolve_block_tag("earliest", 1000).unwrap(), 0);
        assert_eq!(resolve_block_tag("0xa", 1000).unwrap(), 10);
        assert_eq!(resolve_block_tag("ff", 1000).unwrap(), 255);
        assert!(resolve_block_tag("0xzz", 1000).is_err());
    }
}
