//! Solana Transaction Model
//!
//! Logical transaction description plus the canonical serializer that
//! turns it into the exact byte layout validators hash and verify.

mod serializer;

pub use serializer::{serialize_message, serialize_transaction};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::base58;
use crate::error::{WalletError, WalletResult};

/// An Ed25519 public key, always exactly 32 bytes.
///
/// Value-comparable; ordering is lexicographic over the raw bytes, which
/// is what the canonical account table uses as its tie-break.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Construct from a slice, failing unless it is exactly 32 bytes.
    pub fn try_from_slice(bytes: &[u8]) -> WalletResult<Self> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| WalletError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Parse a base58-encoded key (Solana address format).
    pub fn from_base58(text: &str) -> WalletResult<Self> {
        let decoded = base58::decode(text)?;
        Self::try_from_slice(&decoded)
    }

    pub fn to_base58(&self) -> String {
        base58::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base58())
    }
}

/// One account's requested role inside an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub pubkey: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: PublicKey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: true }
    }

    pub fn readonly(pubkey: PublicKey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: false }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: PublicKey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// A logical transaction. `signatures: None` means an unsigned message;
/// when present, signatures must be supplied in signer-table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Base58-encoded 32-byte recent blockhash.
    pub recent_blockhash: String,
    /// Always treated as signer + writable regardless of instruction roles.
    pub fee_payer: PublicKey,
    pub instructions: Vec<Instruction>,
    pub signatures: Option<Vec<TransactionSignature>>,
}

/// A signature paired with the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub pubkey: PublicKey,
    #[serde(with = "serde_sig")]
    pub signature: [u8; 64],
}

/// Serde helper: serde's derive has no built-in support for [u8; 64].
mod serde_sig {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sig: &[u8; 64], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_bytes(sig)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<[u8; 64], D::Error> {
        let bytes: Vec<u8> = Vec::deserialize(de)?;
        bytes
            .try_into()
            .map_err(|b: Vec<u8>| serde::de::Error::invalid_length(b.len(), &"64 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_rejects_wrong_lengths() {
        assert_eq!(
            PublicKey::try_from_slice(&[0u8; 31]),
            Err(WalletError::InvalidKeyLength(31))
        );
        assert_eq!(
            PublicKey::try_from_slice(&[0u8; 33]),
            Err(WalletError::InvalidKeyLength(33))
        );
        assert!(PublicKey::try_from_slice(&[7u8; 32]).is_ok());
    }

    #[test]
    fn public_key_base58_roundtrip() {
        let key = PublicKey::new([42u8; 32]);
        assert_eq!(PublicKey::from_base58(&key.to_base58()).unwrap(), key);
    }

    #[test]
    fn from_base58_rejects_short_decodes() {
        // Decodes fine as base58, but not to 32 bytes.
        assert!(matches!(
            PublicKey::from_base58("abc"),
            Err(WalletError::InvalidKeyLength(_))
        ));
    }

    #[test]
    fn ordering_is_lexicographic_over_raw_bytes() {
        let lo = PublicKey::new([1u8; 32]);
        let hi = PublicKey::new([2u8; 32]);
        assert!(lo < hi);
    }
}
