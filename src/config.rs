//! Wallet configuration

use std::time::Duration;

/// Runtime configuration for the wallet adapter.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// How long a successful authentication unlocks the session.
    pub session_ttl: Duration,
    /// Require authentication on every request rather than per session.
    pub require_auth_per_request: bool,
    /// Optional human-readable account label returned on connect.
    pub account_label: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(120),
            require_auth_per_request: false,
            account_label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_protocol() {
        let config = WalletConfig::default();
        assert_eq!(config.session_ttl, Duration::from_secs(120));
        assert!(!config.require_auth_per_request);
        assert!(config.account_label.is_none());
    }
}
