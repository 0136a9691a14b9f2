//! In-memory ledger used by handler and dispatcher tests.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use num_bigint::BigUint;

use super::client::LedgerClient;
use super::types::*;

#[derive(Default)]
pub(crate) struct MockLedgerClient {
    pub chain_id: String,
    pub net_version: String,
    /// Indexed by block id.
    pub blocks: Vec<Value>,
    /// Overrides the tip derived from `blocks`.
    pub tip: Option<u64>,
    pub currency_pairs: Vec<CurrencyPair>,
    /// Embedded error text returned by mint and burn.
    pub exchange_error: Option<String>,
    /// Makes every call fail as if the gateway were unreachable.
    pub unavailable: bool,
    pub block_requests: Mutex<Vec<GetBlocksArgs>>,
    pub mints: Mutex<Vec<MintOperation>>,
    pub burns: Mutex<Vec<BurnOperation>>,
}

impl MockLedgerClient {
    pub fn with_blocks(count: u64) -> Self {
        Self {
            chain_id: "31337".to_string(),
            net_version: "1".to_string(),
            blocks: (0..count).map(|id| ledger_block(id, Vec::new())).collect(),
            ..Default::default()
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }

    fn tip_height(&self) -> Option<u64> {
        self.tip
            .or_else(|| (self.blocks.len() as u64).checked_sub(1))
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn chain_id(&self) -> Result<String> {
        self.check_available()?;
        Ok(self.chain_id.clone())
    }

    async fn net_version(&self) -> Result<String> {
        self.check_available()?;
        Ok(self.net_version.clone())
    }

    async fn tip_certificate(&self) -> Result<Option<DataCertificate>> {
        self.check_available()?;
        Ok(self.tip_height().map(|tip| DataCertificate {
            certificate: encode_uleb128(tip),
            hash_tree: Vec::new(),
        }))
    }

    async fn get_blocks(&self, args: GetBlocksArgs) -> Result<GetBlocksResult> {
        self.check_available()?;
        self.block_requests.lock().unwrap().push(args);

        let end = args.start.saturating_add(args.length);
        let blocks = (args.start..end)
            .filter_map(|id| {
                self.blocks.get(id as usize).map(|block| BlockWithId {
                    id: BigUint::from(id),
                    block: block.clone(),
                })
            })
            .collect();

        Ok(GetBlocksResult {
            log_length: BigUint::from(self.blocks.len()),
            blocks,
        })
    }

    async fn get_currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        self.check_available()?;
        Ok(self.currency_pairs.clone())
    }

    async fn mint_tokens(&self, operation: &MintOperation) -> Result<ExchangeReply> {
        self.check_available()?;
        self.mints.lock().unwrap().push(operation.clone());
        Ok(self.exchange_reply())
    }

    async fn burn_tokens(&self, operation: &BurnOperation) -> Result<ExchangeReply> {
        self.check_available()?;
        self.burns.lock().unwrap().push(operation.clone());
        Ok(self.exchange_reply())
    }
}

impl MockLedgerClient {
    fn exchange_reply(&self) -> ExchangeReply {
        match &self.exchange_error {
            Some(message) => ExchangeReply::Err(message.clone()),
            None => ExchangeReply::Ok,
        }
    }
}

/// Block whose hash is the big-endian id, chained to the previous id.
pub(crate) fn ledger_block(id: u64, entries: Vec<Value>) -> Value {
    Value::map([
        ("id", Value::nat(id)),
        ("hash", Value::Blob(block_hash_bytes(id))),
        ("phash", Value::Blob(block_hash_bytes(id.saturating_sub(1)))),
        ("ts", Value::nat(1_700_000_000_000_000_000 + id * 1_000_000_000)),
        ("entries", Value::Array(entries)),
        ("finalized", Value::text("true")),
    ])
}

pub(crate) fn block_hash_bytes(id: u64) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub(crate) fn log_entry(caller: &str, operation: &str, details: Value) -> Value {
    Value::map([
        ("timestamp", Value::nat(1_700_000_000)),
        ("operation", Value::text(operation)),
        ("details", details),
        ("caller", Value::text(caller)),
    ])
}

pub(crate) fn encode_uleb128(mut n: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (n & 0x7f) as u8;
        n >>= 7;
        if n == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}
