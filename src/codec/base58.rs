//! Base58 Encoding (Bitcoin alphabet)
//!
//! Arbitrary-precision base conversion: the input is treated as a
//! big-endian unsigned integer and repeatedly divided by 58. Leading zero
//! bytes are preserved as leading '1' symbols, which the integer
//! conversion alone would lose.

use crate::error::{WalletError, WalletResult};

/// The 58-symbol alphabet shared by Bitcoin and Solana.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Reverse lookup from ASCII byte to alphabet index, -1 for invalid.
const DECODE_TABLE: [i8; 128] = {
    let mut table = [-1i8; 128];
    let mut i = 0;
    while i < 58 {
        table[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
};

/// Encode bytes as base58 text. Empty input encodes to the empty string.
pub fn encode(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    // Base58 digits, least-significant first. A byte carries log(256)/log(58)
    // ~= 1.37 digits, so reserve a little more than the input length.
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 138 / 100 + 1);
    for &byte in &input[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    for _ in 0..zeros {
        out.push(ALPHABET[0] as char);
    }
    for &digit in digits.iter().rev() {
        out.push(ALPHABET[digit as usize] as char);
    }
    out
}

/// Decode base58 text back to bytes.
///
/// Fails with [`WalletError::InvalidCharacter`] on any symbol outside the
/// alphabet. One leading zero byte is restored per leading '1'.
pub fn decode(input: &str) -> WalletResult<Vec<u8>> {
    let zeros = input.bytes().take_while(|&b| b == ALPHABET[0]).count();

    // Accumulator in base 256, least-significant first.
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len() * 733 / 1000 + 1);
    for ch in input[zeros..].chars() {
        let index = match u32::from(ch) {
            cp if cp < 128 => DECODE_TABLE[cp as usize],
            _ => -1,
        };
        if index < 0 {
            return Err(WalletError::InvalidCharacter(ch));
        }

        let mut carry = index as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}
