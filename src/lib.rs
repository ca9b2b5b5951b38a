//! Wallet Adapter Core
//!
//! Rust core for a browser-extension-connected Solana wallet.
//!
//! # Architecture
//!
//! This crate provides:
//! - **codec**: Base58 and compact-u16 (shortvec) encoding
//! - **tx**: Transaction model and canonical message serialization
//! - **keystore**: Ed25519 key custody and signing
//! - **rpc**: JSON-RPC 2.0 envelope, parameters and results
//! - **approval**: Pending-request coordination with an async decision handler
//! - **session**: Unlock window and per-origin connection registry
//! - **adapter**: The composed wallet service
//!
//! # Security
//!
//! This crate uses `zeroize` to clear key material from memory. Seeds are
//! wrapped in `Zeroizing` buffers and signing keys are zeroed on drop.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wallet_adapter_core::adapter::WalletAdapter;
//! use wallet_adapter_core::authenticator::AutoApprove;
//! use wallet_adapter_core::config::WalletConfig;
//! use wallet_adapter_core::keystore::MemoryKeyStore;
//!
//! let adapter = WalletAdapter::new(
//!     Arc::new(MemoryKeyStore::new()),
//!     Arc::new(AutoApprove),
//!     WalletConfig::default(),
//! );
//! let response = adapter.handle_raw(r#"{"jsonrpc":"2.0","id":1,"method":"connect","params":{"origin":"https://dapp.example"}}"#).await;
//! ```

pub mod adapter;
pub mod approval;
pub mod authenticator;
pub mod codec;
pub mod config;
pub mod error;
pub mod keystore;
pub mod rpc;
pub mod session;
pub mod tx;

pub use adapter::{WalletAccount, WalletAdapter};
pub use error::{WalletError, WalletResult};
