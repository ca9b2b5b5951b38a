//! Ed25519 Key Custody
//!
//! The [`KeyStore`] trait is the capability boundary around private key
//! material: callers can create, query, sign with, and delete the wallet
//! keypair, but raw private bytes never cross the boundary. Platform
//! secure storage implements this trait; [`MemoryKeyStore`] is the
//! in-process implementation used by hosts and tests.

use std::sync::Mutex;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};
use crate::tx::PublicKey;

/// Capability set for the wallet keypair. One keypair per store.
pub trait KeyStore: Send + Sync {
    /// Create a keypair if none exists; either way return the public key.
    fn create_if_absent(&self) -> WalletResult<PublicKey>;

    /// Public key of the stored keypair, or [`WalletError::KeyNotFound`].
    fn public_key(&self) -> WalletResult<PublicKey>;

    /// Sign arbitrary bytes with the stored private key.
    fn sign(&self, message: &[u8]) -> WalletResult<[u8; 64]>;

    /// Delete the stored keypair. Idempotent.
    fn delete(&self) -> WalletResult<()>;
}

/// In-memory key store. The signing key zeroizes itself on drop.
pub struct MemoryKeyStore {
    key: Mutex<Option<SigningKey>>,
}

impl MemoryKeyStore {
    /// Empty store; a keypair is created on the first `create_if_absent`.
    pub fn new() -> Self {
        Self { key: Mutex::new(None) }
    }

    /// Store seeded from 32 bytes. Deterministic, for tests and demos.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let seed = Zeroizing::new(seed);
        Self {
            key: Mutex::new(Some(SigningKey::from_bytes(&seed))),
        }
    }
}

impl Default for MemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStore for MemoryKeyStore {
    fn create_if_absent(&self) -> WalletResult<PublicKey> {
        let mut guard = self.key.lock().unwrap();
        let key = guard.get_or_insert_with(|| SigningKey::generate(&mut OsRng));
        Ok(PublicKey::new(key.verifying_key().to_bytes()))
    }

    fn public_key(&self) -> WalletResult<PublicKey> {
        let guard = self.key.lock().unwrap();
        guard
            .as_ref()
            .map(|key| PublicKey::new(key.verifying_key().to_bytes()))
            .ok_or(WalletError::KeyNotFound)
    }

    fn sign(&self, message: &[u8]) -> WalletResult<[u8; 64]> {
        let guard = self.key.lock().unwrap();
        let key = guard.as_ref().ok_or(WalletError::KeyNotFound)?;
        Ok(key.sign(message).to_bytes())
    }

    fn delete(&self) -> WalletResult<()> {
        // SigningKey zeroizes on drop.
        self.key.lock().unwrap().take();
        Ok(())
    }
}

/// Verify an Ed25519 signature. Pure; usable without any key store.
///
/// Length violations are errors, not panics. A well-formed signature that
/// simply does not match returns `Ok(false)`.
pub fn verify(signature: &[u8], message: &[u8], public_key: &[u8]) -> WalletResult<bool> {
    if signature.len() != 64 {
        return Err(WalletError::InvalidSignatureLength(signature.len()));
    }
    if public_key.len() != 32 {
        return Err(WalletError::InvalidKeyLength(public_key.len()));
    }

    let pk_bytes: [u8; 32] = public_key
        .try_into()
        .map_err(|_| WalletError::InvalidKeyLength(public_key.len()))?;
    let verifying_key = match VerifyingKey::from_bytes(&pk_bytes) {
        Ok(key) => key,
        // Not a valid curve point: verification fails, it is not a usage error.
        Err(_) => return Ok(false),
    };

    let sig_bytes: [u8; 64] = signature
        .try_into()
        .map_err(|_| WalletError::InvalidSignatureLength(signature.len()))?;
    let sig = Signature::from_bytes(&sig_bytes);

    Ok(verifying_key.verify(message, &sig).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_if_absent_is_idempotent() {
        let store = MemoryKeyStore::new();
        let first = store.create_if_absent().unwrap();
        let second = store.create_if_absent().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.public_key().unwrap(), first);
    }

    #[test]
    fn empty_store_reports_key_not_found() {
        let store = MemoryKeyStore::new();
        assert_eq!(store.public_key(), Err(WalletError::KeyNotFound));
        assert_eq!(store.sign(b"x"), Err(WalletError::KeyNotFound));
    }

    #[test]
    fn delete_removes_the_keypair() {
        let store = MemoryKeyStore::from_seed([9u8; 32]);
        assert!(store.public_key().is_ok());
        store.delete().unwrap();
        assert_eq!(store.public_key(), Err(WalletError::KeyNotFound));
        // Idempotent
        store.delete().unwrap();
    }

    #[test]
    fn signatures_verify_against_the_store_key() {
        let store = MemoryKeyStore::from_seed([1u8; 32]);
        let public_key = store.public_key().unwrap();
        let message = b"canonical bytes";
        let signature = store.sign(message).unwrap();

        assert!(verify(&signature, message, public_key.as_bytes()).unwrap());
        assert!(!verify(&signature, b"other bytes", public_key.as_bytes()).unwrap());

        let other = MemoryKeyStore::from_seed([2u8; 32]);
        let other_key = other.public_key().unwrap();
        assert!(!verify(&signature, message, other_key.as_bytes()).unwrap());
    }

    #[test]
    fn signing_is_deterministic() {
        let store = MemoryKeyStore::from_seed([3u8; 32]);
        assert_eq!(store.sign(b"m").unwrap(), store.sign(b"m").unwrap());
    }

    #[test]
    fn verify_rejects_bad_lengths_with_errors() {
        assert_eq!(
            verify(&[0u8; 63], b"m", &[0u8; 32]),
            Err(WalletError::InvalidSignatureLength(63))
        );
        assert_eq!(
            verify(&[0u8; 64], b"m", &[0u8; 31]),
            Err(WalletError::InvalidKeyLength(31))
        );
    }
}
