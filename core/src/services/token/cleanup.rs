//! Periodic maintenance of expired tokens, blacklist entries and sessions.
//!
//! Runs independently of request handling on a fixed interval and never
//! holds locks that block login/refresh/verify.

use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info, warn};

use crate::domain::clock::Clock;
use crate::errors::DomainResult;
use crate::repositories::{RevocationRepository, SessionRepository, TokenRepository};

use super::cache::VerifyCache;

/// Configuration for the cleanup service
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// How long inactive sessions are retained before deletion (in days)
    pub inactive_session_grace_days: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            inactive_session_grace_days: 30,
            enabled: true,
        }
    }
}

/// Service for sweeping expired rows out of the durable stores.
pub struct CleanupService<T, V, S>
where
    T: TokenRepository + 'static,
    V: RevocationRepository + 'static,
    S: SessionRepository + 'static,
{
    tokens: Arc<T>,
    revocations: Arc<V>,
    sessions: Arc<S>,
    cache: Arc<VerifyCache>,
    config: CleanupConfig,
    clock: Arc<dyn Clock>,
}

impl<T, V, S> CleanupService<T, V, S>
where
    T: TokenRepository,
    V: RevocationRepository,
    S: SessionRepository,
{
    pub fn new(
        tokens: Arc<T>,
        revocations: Arc<V>,
        sessions: Arc<S>,
        cache: Arc<VerifyCache>,
        config: CleanupConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            revocations,
            sessions,
            cache,
            config,
            clock,
        }
    }

    /// Run a single cleanup cycle.
    ///
    /// Deletes refresh tokens and blacklist entries past expiry, sessions
    /// past expiry or long-inactive, and stale verification-cache slots.
    /// Idempotent: a second immediate run deletes nothing.
    pub async fn run_cleanup(&self) -> DomainResult<CleanupResult> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let now = self.clock.now();
        let mut result = CleanupResult::default();

        match self.tokens.delete_expired(now).await {
            Ok(count) => result.refresh_tokens_deleted = count,
            Err(e) => {
                error!("Failed to cleanup expired refresh tokens: {}", e);
                result.errors.push(format!("Refresh token cleanup error: {}", e));
            }
        }

        match self.revocations.delete_expired(now).await {
            Ok(count) => result.revocations_deleted = count,
            Err(e) => {
                error!("Failed to cleanup revocation blacklist: {}", e);
                result.errors.push(format!("Blacklist cleanup error: {}", e));
            }
        }

        match self.cleanup_sessions().await {
            Ok(count) => result.sessions_deleted = count,
            Err(e) => {
                error!("Failed to cleanup sessions: {}", e);
                result.errors.push(format!("Session cleanup error: {}", e));
            }
        }

        result.cache_slots_purged = self.cache.purge_expired(now);

        info!(
            refresh_tokens = result.refresh_tokens_deleted,
            revocations = result.revocations_deleted,
            sessions = result.sessions_deleted,
            cache_slots = result.cache_slots_purged,
            "Cleanup cycle completed"
        );

        Ok(result)
    }

    async fn cleanup_sessions(&self) -> DomainResult<usize> {
        let now = self.clock.now();
        let expired = self.sessions.delete_expired(now).await?;
        let cutoff = now - Duration::days(self.config.inactive_session_grace_days);
        let stale = self.sessions.delete_inactive_before(cutoff).await?;
        Ok(expired + stale)
    }

    /// Start the cleanup service as a background task.
    ///
    /// Spawns a tokio task that runs cleanup at regular intervals.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Cleanup service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Cleanup cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh token rows deleted
    pub refresh_tokens_deleted: usize,
    /// Number of expired blacklist entries deleted
    pub revocations_deleted: usize,
    /// Number of expired or long-inactive session rows deleted
    pub sessions_deleted: usize,
    /// Number of stale verification-cache slots purged
    pub cache_slots_purged: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of rows cleaned up
    pub fn total_cleaned(&self) -> usize {
        self.refresh_tokens_deleted
            + self.revocations_deleted
            + self.sessions_deleted
            + self.cache_slots_purged
    }
}
