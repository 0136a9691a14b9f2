pub mod client;
pub mod types;
pub mod value;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpLedgerClient, LedgerClient};
pub use types::Value;
pub use value::{LedgerBlock, LogEntry};
