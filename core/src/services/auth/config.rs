//! Configuration for the authentication service

use ks_shared::config::{LockoutConfig, SessionPolicyConfig};

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Failed-login lockout policy
    pub lockout: LockoutConfig,
    /// Session concurrency and timeout policy
    pub session: SessionPolicyConfig,
    /// Accepted TOTP step windows either side of now
    pub totp_window: u8,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            lockout: LockoutConfig::default(),
            session: SessionPolicyConfig::default(),
            totp_window: 1,
        }
    }
}
