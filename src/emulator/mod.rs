pub mod block;
pub mod hash;
pub mod logs;

pub use block::{map_ledger_block, resolve_block_tag, EvmBlock};
pub use hash::{extract_block_hash, keccak_hex, pseudo_transaction_hash};
pub use logs::{extract_logs_from_block, get_logs, EvmLog, LogQuery};
