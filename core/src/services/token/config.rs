//! Configuration for the token service

use chrono::Duration;
use ks_shared::config::{JwtConfig, VerifyCacheConfig};

/// Configuration for the token service
#[derive(Debug, Clone, Default)]
pub struct TokenServiceConfig {
    /// JWT signing parameters and lifetimes
    pub jwt: JwtConfig,
    /// Verification cache tuning
    pub cache: VerifyCacheConfig,
}

impl TokenServiceConfig {
    pub fn new(jwt: JwtConfig, cache: VerifyCacheConfig) -> Self {
        Self { jwt, cache }
    }

    /// Access token lifetime as a `Duration`.
    pub fn access_lifetime(&self) -> Duration {
        Duration::seconds(self.jwt.access_token_expiry)
    }

    /// Refresh token lifetime as a `Duration`.
    pub fn refresh_lifetime(&self) -> Duration {
        Duration::seconds(self.jwt.refresh_token_expiry)
    }

    /// Two-factor pending token lifetime as a `Duration`.
    pub fn pending_lifetime(&self) -> Duration {
        Duration::seconds(self.jwt.pending_token_expiry)
    }

    /// Positive verification-cache TTL as a `Duration`.
    pub fn positive_cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache.positive_ttl_seconds)
    }

    /// Negative verification-cache TTL as a `Duration`.
    pub fn negative_cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache.negative_ttl_seconds)
    }
}
