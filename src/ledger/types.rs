use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Serialize};

use crate::translator::principal::Principal;

/// Self-describing value tree returned by the ledger.
///
/// Exactly one variant is populated. Map field names are unique within one
/// record; their order only matters for iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Nat(#[serde(with = "nat_text")] BigUint),
    Int(#[serde(with = "int_text")] BigInt),
    Text(String),
    Blob(#[serde(with = "blob_base64")] Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    pub fn nat(n: u64) -> Self {
        Value::Nat(BigUint::from(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn map<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Variant name, used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nat(_) => "Nat",
            Value::Int(_) => "Int",
            Value::Text(_) => "Text",
            Value::Blob(_) => "Blob",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
        }
    }
}

/// Signed certificate asserting the current head of the block log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCertificate {
    #[serde(with = "blob_base64")]
    pub certificate: Vec<u8>,
    #[serde(with = "blob_base64", default)]
    pub hash_tree: Vec<u8>,
}

/// Arguments for `icrc3_get_blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GetBlocksArgs {
    pub start: u64,
    pub length: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBlocksResult {
    #[serde(with = "nat_text")]
    pub log_length: BigUint,
    #[serde(default)]
    pub blocks: Vec<BlockWithId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockWithId {
    #[serde(with = "nat_text")]
    pub id: BigUint,
    pub block: Value,
}

/// Trading pair listed on the exchange collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPair {
    pub base_currency: String,
    pub quote_currency: String,
    #[serde(with = "nat_text")]
    pub rate: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintOperation {
    pub currency: String,
    #[serde(with = "nat_text")]
    pub amount: BigUint,
    pub recipient: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BurnOperation {
    pub currency: String,
    #[serde(with = "nat_text")]
    pub amount: BigUint,
    pub owner: Principal,
}

/// Outcome of an exchange update call: success, or an error text embedded
/// in an otherwise successful reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeReply {
    Ok,
    Err(String),
}

/// JSON-RPC request to the ledger gateway
#[derive(Debug, Serialize)]
pub struct LedgerRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl LedgerRpcRequest {
    pub fn new(method: &str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC response from the ledger gateway
#[derive(Debug, Deserialize)]
pub struct LedgerRpcResponse {
    /// Absent and `null` both mean "no value" (e.g. an empty block log).
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<LedgerRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerRpcError {
    pub code: i64,
    pub message: String,
}

/// Naturals travel as decimal text so arbitrary precision survives JSON.
pub mod nat_text {
    use num_bigint::BigUint;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(n: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&n.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| D::Error::custom(format!("invalid natural number: {s}")))
    }
}

pub mod int_text {
    use num_bigint::BigInt;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(n: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&n.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigInt::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| D::Error::custom(format!("invalid integer: {s}")))
    }
}

pub mod blob_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(D::Error::custom)
    }
}
