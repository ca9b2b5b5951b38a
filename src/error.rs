//! Unified error types for the wallet adapter core
//!
//! All errors flow through this module for consistent handling
//! and mapping to JSON-RPC error codes at the transport boundary.

use thiserror::Error;

/// Main error type for all wallet adapter operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    // Validation errors: reported synchronously, never retried
    #[error("invalid base58 character: {0:?}")]
    InvalidCharacter(char),

    #[error("invalid compact-u16 encoding: {0}")]
    InvalidCompactLength(String),

    #[error("invalid public key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("recent blockhash must decode to exactly 32 bytes")]
    InvalidBlockhash,

    #[error("signature count {got} does not match {required} required signatures")]
    SignatureCountMismatch { got: usize, required: usize },

    #[error("account table has {0} entries, the u8 index domain allows 256")]
    TooManyAccounts(usize),

    #[error("{field} count {value} does not fit the wire encoding")]
    CountOverflow { field: &'static str, value: usize },

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    // Authorization errors: recoverable by re-authenticating or re-connecting
    #[error("session is locked, authentication required")]
    Locked,

    #[error("origin {0} is not connected")]
    NotConnected(String),

    #[error("user rejected the request")]
    UserRejected,

    // Custody errors: never silently retried
    #[error("no keypair present in the key store")]
    KeyNotFound,

    #[error("key store failure: {0}")]
    Custody(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for wallet adapter operations
pub type WalletResult<T> = Result<T, WalletError>;

impl WalletError {
    /// JSON-RPC error code for this error, per the wallet adapter protocol.
    pub fn rpc_code(&self) -> i64 {
        match self {
            WalletError::UserRejected => 4001,
            WalletError::NotConnected(_) => 4100,
            WalletError::Locked => 4101,
            WalletError::MethodNotFound(_) => -32601,
            WalletError::InvalidCharacter(_)
            | WalletError::InvalidCompactLength(_)
            | WalletError::InvalidKeyLength(_)
            | WalletError::InvalidSignatureLength(_)
            | WalletError::InvalidBlockhash
            | WalletError::SignatureCountMismatch { .. }
            | WalletError::TooManyAccounts(_)
            | WalletError::CountOverflow { .. }
            | WalletError::InvalidParams(_) => -32602,
            WalletError::KeyNotFound
            | WalletError::Custody(_)
            | WalletError::Internal(_) => -32603,
        }
    }
}
