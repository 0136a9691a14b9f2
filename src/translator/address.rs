use ethereum_types::H160;
use num_bigint::BigUint;
use num_traits::Num;
use tracing::debug;

use super::principal::{base32_decode, Principal};
use crate::error::RpcError;

/// Checksum group stripped from a principal's text before it is folded into
/// an Ethereum address.
pub const PRINCIPAL_CHECKSUM_SUFFIX: &str = "-fae";

/// Block tags that `hex_to_decimal` passes through untouched.
pub const BLOCK_TAGS: [&str; 5] = ["latest", "pending", "earliest", "finalized", "safe"];

/// Resolve an Ethereum-side address to a ledger principal.
///
/// Callers put the principal's own text after the `0x` prefix
/// (`0x2vxsx-fae`); that text is the source of truth and must carry a valid
/// checksum.
pub fn eth_address_to_principal(eth_address: &str) -> Result<Principal, RpcError> {
    let principal_text = strip_0x(eth_address);
    Principal::from_text(principal_text)
}

/// Fold a ledger principal's text into a 20-byte Ethereum address.
///
/// The checksum suffix is dropped, the remainder base32-decoded, and the
/// bytes left-padded with zeros or truncated to their last 20 bytes. This
/// loses information whenever the decoded length is not exactly 20, so the
/// result cannot be mapped back to the principal.
pub fn principal_text_to_eth_address(principal_text: &str) -> Result<H160, RpcError> {
    let trimmed = principal_text
        .strip_suffix(PRINCIPAL_CHECKSUM_SUFFIX)
        .unwrap_or(principal_text);
    let compact: String = trimmed.chars().filter(|c| *c != '-').collect();

    let decoded = base32_decode(&compact)
        .map_err(|e| RpcError::AddressDecode(format!("{}: {}", principal_text, e)))?;

    let mut address = [0u8; 20];
    if decoded.len() <= 20 {
        address[20 - decoded.len()..].copy_from_slice(&decoded);
    } else {
        address.copy_from_slice(&decoded[decoded.len() - 20..]);
    }

    debug!(
        "principal {} -> {} decoded bytes -> 0x{}",
        principal_text,
        decoded.len(),
        hex::encode(address)
    );
    Ok(H160::from(address))
}

/// Render an address as lowercase `0x`-prefixed hex.
pub fn format_eth_address(address: &H160) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Parse a hexadecimal amount (optionally `0x`-prefixed) into an unbounded
/// natural number.
pub fn parse_hex_amount(amount: &str) -> Result<BigUint, RpcError> {
    let digits = strip_0x(amount);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RpcError::AmountParse(amount.to_string()));
    }
    BigUint::from_str_radix(digits, 16).map_err(|_| RpcError::AmountParse(amount.to_string()))
}

/// Convert a hex block number to decimal text. Block tags pass through
/// unchanged.
pub fn hex_to_decimal(hex: &str) -> Result<String, RpcError> {
    let digits = strip_0x(hex);
    if BLOCK_TAGS.contains(&digits) {
        return Ok(digits.to_string());
    }

    u64::from_str_radix(digits, 16)
        .map(|n| n.to_string())
        .map_err(|e| RpcError::invalid_params("block number", format!("{}: {}", hex, e)))
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
