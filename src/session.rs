//! Session State
//!
//! Two small pieces of authorization state consumed by the approval flow:
//! a time-boxed unlock ([`SessionLock`]) extended by successful
//! authentication, and the per-origin connection set ([`SessionRegistry`]).

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{WalletError, WalletResult};

/// Self-expiring unlock state. There is no background timer: whether the
/// session is unlocked is recomputed against the clock on every read.
#[derive(Debug, Default)]
pub struct SessionLock {
    unlock_until: Mutex<Option<Instant>>,
}

impl SessionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock for `duration` from now, overwriting any prior expiry.
    pub fn unlock_for(&self, duration: Duration) {
        let mut until = self.unlock_until.lock().unwrap();
        *until = Some(Instant::now() + duration);
    }

    /// Lock immediately.
    pub fn lock(&self) {
        let mut until = self.unlock_until.lock().unwrap();
        *until = None;
    }

    /// True iff an expiry exists and lies strictly in the future.
    pub fn is_unlocked(&self) -> bool {
        let until = self.unlock_until.lock().unwrap();
        match *until {
            Some(expiry) => Instant::now() < expiry,
            None => false,
        }
    }

    /// Fails with [`WalletError::Locked`] unless currently unlocked.
    pub fn require_unlock(&self) -> WalletResult<()> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(WalletError::Locked)
        }
    }

    /// Remaining unlock duration, or `None` when locked or expired.
    pub fn remaining_unlock_time(&self) -> Option<Duration> {
        let until = self.unlock_until.lock().unwrap();
        until.and_then(|expiry| expiry.checked_duration_since(Instant::now()))
    }
}

/// The set of origins that have completed `connect`. Pure membership,
/// no TTL; signing operations consult it before touching the key store.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    origins: Mutex<HashSet<String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, origin: &str) {
        self.origins.lock().unwrap().insert(origin.to_string());
    }

    pub fn disconnect(&self, origin: &str) {
        self.origins.lock().unwrap().remove(origin);
    }

    pub fn is_connected(&self, origin: &str) -> bool {
        self.origins.lock().unwrap().contains(origin)
    }

    pub fn all_connected(&self) -> Vec<String> {
        let mut origins: Vec<String> = self.origins.lock().unwrap().iter().cloned().collect();
        origins.sort();
        origins
    }

    pub fn disconnect_all(&self) {
        self.origins.lock().unwrap().clear();
    }

    /// Fails with [`WalletError::NotConnected`] unless the origin has
    /// connected.
    pub fn require_connected(&self, origin: &str) -> WalletResult<()> {
        if self.is_connected(origin) {
            Ok(())
        } else {
            Err(WalletError::NotConnected(origin.to_string()))
        }
    }
}
