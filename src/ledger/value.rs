//! Typed views over Dynamic Ledger Values.
//!
//! Each record is decoded by walking its Map entries once and matching the
//! variant of every known field. Unknown fields are skipped so newer ledgers
//! can add fields without breaking the adapter. Nested values (block
//! entries, log details) are kept as [`Value`]s and decoded by whoever
//! consumes them.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::types::Value;
use crate::error::DecodeError;

/// A block of the ledger's append-only log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerBlock {
    pub id: BigUint,
    pub hash: Vec<u8>,
    pub parent_hash: Vec<u8>,
    /// Nanoseconds since the Unix epoch.
    pub ts: u64,
    pub entries: Vec<Value>,
    pub finalized: bool,
}

impl LedgerBlock {
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = value.as_map().ok_or(DecodeError::ExpectedMap)?;

        let mut block = LedgerBlock {
            id: BigUint::default(),
            hash: Vec::new(),
            parent_hash: Vec::new(),
            ts: 0,
            entries: Vec::new(),
            finalized: false,
        };

        for (name, field) in fields {
            match name.as_str() {
                "id" => block.id = expect_nat(name, field)?.clone(),
                "hash" => block.hash = expect_blob(name, field)?.to_vec(),
                "phash" => block.parent_hash = expect_blob(name, field)?.to_vec(),
                "ts" => block.ts = nat_to_u64(name, expect_nat(name, field)?)?,
                "entries" => block.entries = expect_array(name, field)?.to_vec(),
                "finalized" => block.finalized = expect_text(name, field)? == "true",
                _ => {}
            }
        }

        Ok(block)
    }
}

/// One element of a block's `entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: u64,
    pub operation: String,
    pub details: Value,
    /// Text form of the calling principal.
    pub caller: String,
}

impl LogEntry {
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = value.as_map().ok_or(DecodeError::ExpectedMap)?;

        let mut entry = LogEntry {
            timestamp: 0,
            operation: String::new(),
            details: Value::Map(Vec::new()),
            caller: String::new(),
        };

        for (name, field) in fields {
            match name.as_str() {
                "timestamp" => entry.timestamp = nat_to_u64(name, expect_nat(name, field)?)?,
                "operation" => entry.operation = expect_text(name, field)?.to_string(),
                "details" => entry.details = field.clone(),
                "caller" => entry.caller = expect_text(name, field)?.to_string(),
                _ => {}
            }
        }

        Ok(entry)
    }
}

/// Find a field by name in a Map value without decoding the whole record.
pub fn find_field<'a>(value: &'a Value, field: &str) -> Result<Option<&'a Value>, DecodeError> {
    let fields = value.as_map().ok_or(DecodeError::ExpectedMap)?;
    Ok(fields
        .iter()
        .find(|(name, _)| name == field)
        .map(|(_, v)| v))
}

fn invalid(field: &str, expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::InvalidField {
        field: field.to_string(),
        expected,
        found: found.kind(),
    }
}

pub fn expect_nat<'a>(field: &str, value: &'a Value) -> Result<&'a BigUint, DecodeError> {
    match value {
        Value::Nat(n) => Ok(n),
        other => Err(invalid(field, "Nat", other)),
    }
}

pub fn expect_blob<'a>(field: &str, value: &'a Value) -> Result<&'a [u8], DecodeError> {
    match value {
        Value::Blob(b) => Ok(b),
        other => Err(invalid(field, "Blob", other)),
    }
}

pub fn expect_text<'a>(field: &str, value: &'a Value) -> Result<&'a str, DecodeError> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(invalid(field, "Text", other)),
    }
}

pub fn expect_array<'a>(field: &str, value: &'a Value) -> Result<&'a [Value], DecodeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(invalid(field, "Array", other)),
    }
}

fn nat_to_u64(field: &str, n: &BigUint) -> Result<u64, DecodeError> {
    n.to_u64().ok_or_else(|| DecodeError::Overflow {
        field: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Value {
        Value::map([
            ("id", Value::nat(7)),
            ("hash", Value::Blob(vec![0xaa, 0xbb])),
            ("phash", Value::Blob(vec![0x11])),
            ("btype", Value::text("logger")),
            ("ts", Value::nat(1_700_000_000_123_456_789)),
            ("entries", Value::Array(vec![Value::map([("caller", Value::text("2vxsx-fae"))])])),
            ("finalized", Value::text("true")),
        ])
    }

    #[test]
    fn test_decode_block() {
        let block = LedgerBlock::decode(&sample_block()).unwrap();
        assert_eq!(block.id, BigUint::from(7u32));
        assert_eq!(block.hash, vec![0xaa, 0xbb]);
        assert_eq!(block.parent_hash, vec![0x11]);
        assert_eq!(block.ts, 1_700_000_000_123_456_789);
        assert_eq!(block.entries.len(), 1);
        assert!(block.finalized);
    }

    #[test]
    fn test_decode_block_missing_fields_default() {
        let block = LedgerBlock::decode(&Value::map([("id", Value::nat(3))])).unwrap();
        assert_eq!(block.id, BigUint::from(3u32));
        assert!(block.hash.is_empty());
        assert!(block.entries.is_empty());
        assert!(!block.finalized);
    }

    #[test]
    fn test_decode_block_requires_map() {
        assert_eq!(
            LedgerBlock::decode(&Value::text("block")),
            Err(DecodeError::ExpectedMap)
        );
    }

    #[test]
    fn test_decode_block_wrong_variant_names_field() {
        let value = Value::map([("hash", Value::text("not a blob"))]);
        let err = LedgerBlock::decode(&value).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                field: "hash".to_string(),
                expected: "Blob",
                found: "Text",
            }
        );
        assert!(err.to_string().contains("hash"));
    }

    #[test]
    fn test_decode_ts_overflow() {
        let huge = BigUint::from(u64::MAX) + 1u32;
        let value = Value::map([("ts", Value::Nat(huge))]);
        assert_eq!(
            LedgerBlock::decode(&value),
            Err(DecodeError::Overflow {
                field: "ts".to_string()
            })
        );
    }

    #[test]
    fn test_decode_log_entry() {
        let details = Value::map([("amount", Value::nat(5))]);
        let value = Value::map([
            ("timestamp", Value::nat(42)),
            ("operation", Value::text("mint")),
            ("details", details.clone()),
            ("caller", Value::text("2vxsx-fae")),
            ("extra", Value::Blob(vec![])),
        ]);

        let entry = LogEntry::decode(&value).unwrap();
        assert_eq!(entry.timestamp, 42);
        assert_eq!(entry.operation, "mint");
        assert_eq!(entry.details, details);
        assert_eq!(entry.caller, "2vxsx-fae");
    }

    #[test]
    fn test_find_field() {
        let block = sample_block();
        assert_eq!(
            find_field(&block, "hash").unwrap(),
            Some(&Value::Blob(vec![0xaa, 0xbb]))
        );
        assert_eq!(find_field(&block, "nope").unwrap(), None);
        assert!(find_field(&Value::nat(1), "hash").is_err());
    }
}
