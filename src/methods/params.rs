//! Typed parameter schemas, one per method that takes parameters.
//!
//! Params arrive as opaque JSON. Each schema validates shape immediately
//! after method lookup so handlers only deal with typed values.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::emulator::block::resolve_block_tag;
use crate::emulator::logs::LogQuery;
use crate::error::RpcError;
use crate::ledger::types::{BurnOperation, MintOperation};
use crate::translator::address::{eth_address_to_principal, parse_hex_amount, strip_0x, BLOCK_TAGS};

/// Positional params as a slice. Absent or `null` params are an empty list.
fn positional<'a>(method: &'static str, params: &'a Value) -> Result<&'a [Value], RpcError> {
    match params {
        Value::Null => Ok(&[]),
        Value::Array(items) => Ok(items),
        _ => Err(RpcError::invalid_params(method, "expected a parameter array")),
    }
}

fn required<'a>(
    method: &'static str,
    params: &'a [Value],
    index: usize,
    name: &str,
) -> Result<&'a Value, RpcError> {
    params
        .get(index)
        .ok_or_else(|| RpcError::invalid_params(method, format!("missing {}", name)))
}

fn decode<T: DeserializeOwned>(method: &'static str, value: &Value, name: &str) -> Result<T, RpcError> {
    T::deserialize(value).map_err(|e| RpcError::invalid_params(method, format!("{}: {}", name, e)))
}

fn optional_bool(method: &'static str, params: &[Value], index: usize) -> Result<bool, RpcError> {
    match params.get(index) {
        None | Some(Value::Null) => Ok(false),
        Some(value) => decode(method, value, "full transactions flag"),
    }
}

/// `eth_getBlockByNumber [block, fullTransactions?]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockByNumberParams {
    pub block: String,
    /// Accepted for compatibility. Blocks never carry transactions.
    pub full_transactions: bool,
}

impl BlockByNumberParams {
    const METHOD: &'static str = "eth_getBlockByNumber";

    pub fn parse(params: &Value) -> Result<Self, RpcError> {
        let params = positional(Self::METHOD, params)?;
        Ok(Self {
            block: decode(Self::METHOD, required(Self::METHOD, params, 0, "block number")?, "block number")?,
            full_transactions: optional_bool(Self::METHOD, params, 1)?,
        })
    }
}

/// `eth_getBlockByHash [hash, fullTransactions?]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockByHashParams {
    pub hash: String,
    pub full_transactions: bool,
}

impl BlockByHashParams {
    const METHOD: &'static str = "eth_getBlockByHash";

    pub fn parse(params: &Value) -> Result<Self, RpcError> {
        let params = positional(Self::METHOD, params)?;
        Ok(Self {
            hash: decode(Self::METHOD, required(Self::METHOD, params, 0, "block hash")?, "block hash")?,
            full_transactions: optional_bool(Self::METHOD, params, 1)?,
        })
    }
}

/// A block bound in a log filter: a JSON number, a tag, `0x` hex or
/// decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BlockParam {
    Number(u64),
    Text(String),
}

impl BlockParam {
    pub fn resolve(&self, tip: u64) -> Result<u64, RpcError> {
        match self {
            BlockParam::Number(n) => Ok(*n),
            BlockParam::Text(s) if BLOCK_TAGS.contains(&s.as_str()) || s.starts_with("0x") => {
                resolve_block_tag(s, tip)
            }
            BlockParam::Text(s) => s.parse().map_err(|_| {
                RpcError::invalid_params(LogFilter::METHOD, format!("invalid block number: {}", s))
            }),
        }
    }
}

/// `eth_getLogs [filter]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(default)]
    pub from_block: Option<BlockParam>,
    #[serde(default)]
    pub to_block: Option<BlockParam>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub block_hash: Option<String>,
}

impl LogFilter {
    const METHOD: &'static str = "eth_getLogs";

    pub fn parse(params: &Value) -> Result<Self, RpcError> {
        let params = positional(Self::METHOD, params)?;
        decode(Self::METHOD, required(Self::METHOD, params, 0, "filter")?, "filter")
    }

    /// Resolve the bounds against the tip. `fromBlock` defaults to 0 and
    /// `toBlock` to the tip.
    pub fn to_query(&self, tip: u64) -> Result<LogQuery, RpcError> {
        let from_block = match &self.from_block {
            Some(param) => param.resolve(tip)?,
            None => 0,
        };
        let to_block = match &self.to_block {
            Some(param) => param.resolve(tip)?,
            None => tip,
        };

        Ok(LogQuery {
            from_block,
            to_block,
            address: self.address.clone().filter(|a| !a.is_empty()),
            block_hash: self.block_hash.clone().filter(|h| !h.is_empty()),
        })
    }
}

/// `web3_sha3 [data]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sha3Params {
    pub data: Vec<u8>,
}

impl Sha3Params {
    const METHOD: &'static str = "web3_sha3";

    pub fn parse(params: &Value) -> Result<Self, RpcError> {
        let params = positional(Self::METHOD, params)?;
        let input: String = decode(Self::METHOD, required(Self::METHOD, params, 0, "data")?, "data")?;
        let data = hex::decode(strip_0x(&input))
            .map_err(|e| RpcError::invalid_params(Self::METHOD, format!("invalid hex string: {}", e)))?;
        Ok(Self { data })
    }
}

/// `eth_mintTokens [{currency, amount, recipient}]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MintRequest {
    pub currency: String,
    /// Hex amount
    pub amount: String,
    /// `0x` followed by the recipient principal's text
    pub recipient: String,
}

impl MintRequest {
    const METHOD: &'static str = "eth_mintTokens";

    pub fn parse(params: &Value) -> Result<Self, RpcError> {
        let params = positional(Self::METHOD, params)?;
        decode(Self::METHOD, required(Self::METHOD, params, 0, "mint request")?, "mint request")
    }

    pub fn into_operation(self) -> Result<MintOperation, RpcError> {
        Ok(MintOperation {
            amount: parse_hex_amount(&self.amount)?,
            recipient: eth_address_to_principal(&self.recipient)?,
            currency: self.currency,
        })
    }
}

/// `eth_burnTokens [{currency, amount, owner}]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BurnRequest {
    pub currency: String,
    pub amount: String,
    pub owner: String,
}

impl BurnRequest {
    const METHOD: &'static str = "eth_burnTokens";

    pub fn parse(params: &Value) -> Result<Self, RpcError> {
        let params = positional(Self::METHOD, params)?;
        decode(Self::METHOD, required(Self::METHOD, params, 0, "burn request")?, "burn request")
    }

    pub fn into_operation(self) -> Result<BurnOperation, RpcError> {
        Ok(BurnOperation {
            amount: parse_hex_amount(&self.amount)?,
            owner: eth_address_to_principal(&self.owner)?,
            currency: self.currency,
        })
    }
}
