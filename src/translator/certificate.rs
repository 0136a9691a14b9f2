use tracing::debug;

use crate::error::CertificateError;

/// Decode the block height embedded at the start of a tip certificate.
///
/// The height is an unsigned LEB128 integer: seven payload bits per byte,
/// least significant group first, high bit set on every byte but the last.
pub fn decode_certificate_height(data: &[u8]) -> Result<u64, CertificateError> {
    let mut height: u64 = 0;
    let mut shift: u32 = 0;

    for &byte in data {
        height |= u64::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            debug!("decoded certificate height {} ({} bytes)", height, shift / 7 + 1);
            return Ok(height);
        }

        shift += 7;
        if shift >= 64 {
            return Err(CertificateError::Overflow);
        }
    }

    Err(CertificateError::UnexpectedEof)
}
