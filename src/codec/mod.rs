//! Wire encodings shared across the adapter
//!
//! - `base58`: Bitcoin-alphabet base58 used for addresses, blockhashes and
//!   transaction signatures
//! - `compact`: Solana's compact-u16 length encoding

pub mod base58;
pub mod compact;

pub use compact::{read_compact_u16, write_compact_u16};
