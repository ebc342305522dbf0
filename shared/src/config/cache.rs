//! Token verification cache configuration

use serde::{Deserialize, Serialize};

/// Tuning for the in-process token verification cache.
///
/// The cache only amortizes signature and parse cost; revocation is
/// re-checked on every verification regardless of a cache hit, so the
/// positive TTL bounds wasted CPU, not the revocation window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyCacheConfig {
    /// TTL for cached successful verifications, in seconds
    pub positive_ttl_seconds: i64,

    /// TTL for cached parse/signature failures, in seconds. Kept shorter
    /// than the positive TTL so a repeatedly-presented garbage token is
    /// cheap to reject without pinning the failure for long.
    pub negative_ttl_seconds: i64,
}

impl Default for VerifyCacheConfig {
    fn default() -> Self {
        Self {
            positive_ttl_seconds: 300, // 5 minutes
            negative_ttl_seconds: 60,  // 1 minute
        }
    }
}
