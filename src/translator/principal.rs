use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::RpcError;

/// Longest principal the ledger accepts, in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 29;

const CHECKSUM_LEN: usize = 4;
const GROUP_LEN: usize = 5;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Ledger account/identity identifier.
///
/// Textual form is `base32(crc32_be(bytes) ++ bytes)`, lowercase and
/// unpadded, split into groups of five characters joined by `-`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Principal(Vec<u8>);

impl Principal {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RpcError> {
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(RpcError::AddressDecode(format!(
                "principal is {} bytes, at most {} allowed",
                bytes.len(),
                MAX_PRINCIPAL_LEN
            )));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// The all-anonymous caller, `2vxsx-fae`.
    pub fn anonymous() -> Self {
        Self(vec![0x04])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Parse and validate the textual form, including the checksum and the
    /// canonical grouping.
    pub fn from_text(text: &str) -> Result<Self, RpcError> {
        let compact: String = text.chars().filter(|c| *c != '-').collect();
        if compact.is_empty() {
            return Err(RpcError::AddressDecode("empty principal text".to_string()));
        }

        let decoded = base32_decode(&compact.to_ascii_lowercase())
            .map_err(|e| RpcError::AddressDecode(format!("{}: {}", text, e)))?;
        if decoded.len() < CHECKSUM_LEN {
            return Err(RpcError::AddressDecode(format!(
                "{}: too short to hold a checksum",
                text
            )));
        }

        let (checksum, bytes) = decoded.split_at(CHECKSUM_LEN);
        let expected = crc32fast::hash(bytes).to_be_bytes();
        if checksum != expected {
            return Err(RpcError::AddressDecode(format!("{}: checksum mismatch", text)));
        }

        let principal = Self::from_slice(bytes)?;
        if principal.to_text() != text {
            return Err(RpcError::AddressDecode(format!(
                "{}: not in canonical form (expected {})",
                text,
                principal.to_text()
            )));
        }
        Ok(principal)
    }

    pub fn to_text(&self) -> String {
        let mut payload = crc32fast::hash(&self.0).to_be_bytes().to_vec();
        payload.extend_from_slice(&self.0);

        let encoded = base32_encode(&payload);
        let groups: Vec<&str> = encoded
            .as_bytes()
            .chunks(GROUP_LEN)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok())
            .collect();
        groups.join("-")
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

/// RFC 4648 base32 without padding, lowercase.
pub fn base32_encode(input: &[u8]) -> String {
    let mut result = String::with_capacity(input.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut bits_in_buffer = 0;

    for &byte in input {
        buffer = (buffer << 8) | byte as u32;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            result.push(ALPHABET[((buffer >> bits_in_buffer) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits_in_buffer) - 1;
    }

    if bits_in_buffer > 0 {
        result.push(ALPHABET[((buffer << (5 - bits_in_buffer)) & 0x1f) as usize] as char);
    }

    result
}

/// Lenient RFC 4648 base32 decoding: case-insensitive, stops at padding and
/// drops trailing bits that do not complete a byte.
pub fn base32_decode(input: &str) -> Result<Vec<u8>, String> {
    let mut result = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for ch in input.bytes() {
        if ch == b'=' {
            break;
        }
        let lower = ch.to_ascii_lowercase();
        let val = ALPHABET
            .iter()
            .position(|&c| c == lower)
            .ok_or_else(|| format!("invalid base32 character: {}", ch as char))?
            as u64;

        buffer = (buffer << 5) | val;
        bits_in_buffer += 5;

        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result.push((buffer >> bits_in_buffer) as u8);
            buffer &= (1 << bits_in_buffer) - 1;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_principals() {
        assert_eq!(Principal::anonymous().to_text(), "2vxsx-fae");
        assert_eq!(Principal::from_slice(&[]).unwrap().to_text(), "aaaaa-aa");
        assert_eq!(
            Principal::from_slice(&[0, 0, 0, 0, 0, 0, 0, 1, 1, 1])
                .unwrap()
                .to_text(),
            "rrkah-fqaaa-aaaaa-aaaaq-cai"
        );
    }

    #[test]
    fn test_from_text() {
        assert_eq!(Principal::from_text("2vxsx-fae").unwrap(), Principal::anonymous());
        assert_eq!(
            Principal::from_text("rrkah-fqaaa-aaaaa-aaaaq-cai").unwrap().as_slice(),
            &[0, 0, 0, 0, 0, 0, 0, 1, 1, 1]
        );
    }

    #[test]
    fn test_from_text_rejects_bad_input() {
        assert!(Principal::from_text("").is_err());
        assert!(Principal::from_text("invalid-principal").is_err());
        // Checksum no longer matches after flipping one character.
        assert!(Principal::from_text("rrkah-fqaaa-aaaaa-aaaaq-caa").is_err());
        // Right bytes, wrong grouping.
        assert!(Principal::from_text("2vxsxfae").is_err());
    }

    #[test]
    fn test_base32() {
        assert_eq!(base32_encode(b"foobar"), "mzxw6ytboi");
        assert_eq!(base32_decode("MZXW6YTBOI").unwrap(), b"foobar");
        assert_eq!(base32_decode("mzxw6ytboi======").unwrap(), b"foobar");
        assert!(base32_decode("mz1w").is_err());
    }
}
