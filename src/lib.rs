//! EVM Adapter
//!
//! This crate implements a JSON-RPC server that accepts Ethereum-compatible
//! RPC calls (eth_*, net_*, web3_*) and answers them from a ledger that
//! exposes an ICRC-3 style append-only block log. Standard EVM tooling can
//! read blocks and logs from the ledger, and a small set of exchange calls
//! is forwarded to a companion dex.
//!
//! # Architecture
//!
//! ```text
//! Wallet / indexer / ethers.js
//!     |
//!     | eth_* JSON-RPC over POST /rpc/v1
//!     v
//! EVM Adapter (this crate)
//!     |
//!     | ledger gateway JSON-RPC (blocks, tip certificate, dex calls)
//!     v
//! Ledger (logger + dex canisters)
//! ```
//!
//! # Modules
//!
//! - `config` - Environment and configuration management
//! - `dispatch` - JSON-RPC envelope parsing and method routing
//! - `server` - HTTP surface
//! - `methods` - Individual RPC method implementations and their params
//! - `ledger` - Dynamic ledger values and the ledger client
//! - `translator` - Principal, address, amount and certificate codecs
//! - `emulator` - Block/log emulation (ledger block -> EVM format)
//! - `error` - Error kinds reported to clients

pub mod config;
pub mod dispatch;
pub mod emulator;
pub mod error;
pub mod ledger;
pub mod methods;
pub mod server;
pub mod translator;
