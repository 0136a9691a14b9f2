//! Presentational hashes for ledger data.
//!
//! Nothing here is a commitment the ledger itself signs. Block hashes are
//! copied out of the block record; transaction hashes are synthesised so
//! that logs have a stable `transactionHash` to show.

use sha3::{Digest, Keccak256};

use crate::error::{DecodeError, RpcError};
use crate::ledger::types::Value;
use crate::ledger::value::{expect_blob, find_field};

/// Keccak-256 of `data` as `0x`-prefixed lowercase hex.
pub fn keccak_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(Keccak256::digest(data)))
}

/// Read the `hash` blob of a block record as `0x`-prefixed hex.
pub fn extract_block_hash(block: &Value) -> Result<String, RpcError> {
    let hash = find_field(block, "hash")?.ok_or_else(|| DecodeError::MissingField {
        field: "hash".to_string(),
    })?;
    Ok(format!("0x{}", hex::encode(expect_blob("hash", hash)?)))
}

/// Deterministic stand-in for a transaction hash: Keccak-256 over a
/// canonical byte serialisation of the whole block record.
pub fn pseudo_transaction_hash(block: &Value) -> String {
    let mut hasher = Keccak256::new();
    write_canonical(&mut hasher, block);
    format!("0x{}", hex::encode(hasher.finalize()))
}

// Every node is a one-byte variant tag followed by length-prefixed content,
// so distinct trees never serialise to the same bytes.
fn write_canonical(hasher: &mut Keccak256, value: &Value) {
    match value {
        Value::Nat(n) => write_tagged(hasher, 0, &n.to_bytes_be()),
        Value::Int(i) => write_tagged(hasher, 1, &i.to_signed_bytes_be()),
        Value::Text(s) => write_tagged(hasher, 2, s.as_bytes()),
        Value::Blob(b) => write_tagged(hasher, 3, b),
        Value::Array(items) => {
            hasher.update([4u8]);
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                write_canonical(hasher, item);
            }
        }
        Value::Map(fields) => {
            hasher.update([5u8]);
            hasher.update((fields.len() as u64).to_be_bytes());
            for (name, field) in fields {
                write_bytes(hasher, name.as_bytes());
                write_canonical(hasher, field);
            }
        }
    }
}

fn write_tagged(hasher: &mut Keccak256, tag: u8, bytes: &[u8]) {
    hasher.update([tag]);
    write_bytes(hasher, bytes);
}

fn write_bytes(hasher: &mut Keccak256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
