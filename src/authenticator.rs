//! Authenticator boundary
//!
//! The platform biometric/passkey flow lives outside this crate; the
//! adapter only needs an opaque "authenticate the user" suspend point.
//! On success the caller extends the session lock by the configured TTL.

use async_trait::async_trait;

use crate::error::{WalletError, WalletResult};

/// Opaque user-presence check invoked while the session is locked.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves once the user has authenticated; fails otherwise.
    async fn authenticate(&self) -> WalletResult<()>;
}

/// Authenticator that always succeeds. For hosts without a platform
/// authenticator and for tests.
pub struct AutoApprove;

#[async_trait]
impl Authenticator for AutoApprove {
    async fn authenticate(&self) -> WalletResult<()> {
        Ok(())
    }
}

/// Authenticator that always fails. For tests of the locked path.
pub struct Denying;

#[async_trait]
impl Authenticator for Denying {
    async fn authenticate(&self) -> WalletResult<()> {
        Err(WalletError::Locked)
    }
}
