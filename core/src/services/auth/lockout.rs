//! Windowed failed-login tracking for brute force protection.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::warn;

use ks_shared::config::LockoutConfig;

/// In-process tracker of failed login attempts per account key.
///
/// An account is locked while the number of failures inside the sliding
/// window is at or above the configured threshold; entries age out of the
/// window on their own, so there is no explicit unlock step.
pub struct LockoutTracker {
    attempts: DashMap<String, Vec<DateTime<Utc>>>,
    config: LockoutConfig,
}

impl LockoutTracker {
    pub fn new(config: LockoutConfig) -> Self {
        Self {
            attempts: DashMap::new(),
            config,
        }
    }

    fn window(&self) -> Duration {
        Duration::seconds(self.config.window_seconds)
    }

    /// Record a failed attempt, returning the count inside the window.
    pub fn record_failure(&self, key: &str, now: DateTime<Utc>) -> u32 {
        let cutoff = now - self.window();
        let mut entry = self.attempts.entry(key.to_string()).or_default();
        entry.retain(|at| *at >= cutoff);
        entry.push(now);

        let count = entry.len() as u32;
        if count >= self.config.max_failed_attempts {
            warn!(
                key = key,
                attempts = count,
                "Account locked after repeated failed login attempts"
            );
        }
        count
    }

    /// Number of failures currently inside the window.
    pub fn failed_attempts(&self, key: &str, now: DateTime<Utc>) -> u32 {
        let cutoff = now - self.window();
        match self.attempts.get(key) {
            Some(entry) => entry.iter().filter(|at| **at >= cutoff).count() as u32,
            None => 0,
        }
    }

    /// Whether the account is currently locked.
    pub fn is_locked(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.failed_attempts(key, now) >= self.config.max_failed_attempts
    }

    /// Clear the counter after a successful authentication.
    pub fn clear(&self, key: &str) {
        self.attempts.remove(key);
    }
}
