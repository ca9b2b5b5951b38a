//! Compact-u16 Encoding
//!
//! Solana's variable-length count encoding: 7 data bits per byte with a
//! continuation flag in the high bit, least-significant group first.
//! The domain is a 16-bit count, so a valid encoding is at most 3 bytes.

use crate::error::{WalletError, WalletResult};

/// Append the compact-u16 encoding of `value` to `buf`.
pub fn write_compact_u16(value: u16, buf: &mut Vec<u8>) {
    if value < 0x80 {
        buf.push(value as u8);
    } else if value < 0x4000 {
        buf.push((value & 0x7f) as u8 | 0x80);
        buf.push((value >> 7) as u8);
    } else {
        buf.push((value & 0x7f) as u8 | 0x80);
        buf.push(((value >> 7) & 0x7f) as u8 | 0x80);
        buf.push((value >> 14) as u8);
    }
}

/// Read a compact-u16 from the front of `bytes`.
///
/// Returns the decoded value and the number of bytes consumed. Rejects
/// truncated sequences and encodings that exceed the 16-bit domain.
pub fn read_compact_u16(bytes: &[u8]) -> WalletResult<(u16, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if i >= 3 {
            return Err(WalletError::InvalidCompactLength(
                "more than 3 bytes".into(),
            ));
        }
        value |= ((byte & 0x7f) as u32) << (7 * i as u32);
        if byte & 0x80 == 0 {
            if value > u16::MAX as u32 {
                return Err(WalletError::InvalidCompactLength(format!(
                    "value {value} exceeds u16"
                )));
            }
            return Ok((value as u16, i + 1));
        }
    }
    Err(WalletError::InvalidCompactLength("truncated sequence".into()))
}
