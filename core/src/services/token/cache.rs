//! Short-TTL cache of verification outcomes.
//!
//! The cache amortizes signature and parse cost for hot tokens. It never
//! stands in for the revocation check: callers re-consult the blacklist on
//! every cache-warm positive hit. Negative entries use a shorter TTL so a
//! repeatedly-presented bad token is cheap to reject without pinning the
//! failure for long.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::entities::token::Claims;
use crate::errors::TokenError;

/// Cached result of verifying one raw token string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Valid(Claims),
    Invalid(TokenError),
}

#[derive(Debug, Clone)]
struct Slot {
    outcome: VerifyOutcome,
    expires_at: DateTime<Utc>,
}

/// Concurrent map from raw token string to verification outcome.
///
/// Safe under parallel readers and writers; per-key consistency is all
/// that is required, no global ordering.
#[derive(Default)]
pub struct VerifyCache {
    slots: DashMap<String, Slot>,
}

impl VerifyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached outcome, lazily dropping a stale slot.
    pub fn get(&self, token: &str, now: DateTime<Utc>) -> Option<VerifyOutcome> {
        let expired = match self.slots.get(token) {
            Some(slot) if now < slot.expires_at => return Some(slot.outcome.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.slots.remove(token);
        }
        None
    }

    /// Cache a successful verification until `expires_at`.
    pub fn insert_valid(&self, token: &str, claims: Claims, expires_at: DateTime<Utc>) {
        self.slots.insert(
            token.to_string(),
            Slot {
                outcome: VerifyOutcome::Valid(claims),
                expires_at,
            },
        );
    }

    /// Cache a parse/signature failure until `expires_at`.
    pub fn insert_invalid(&self, token: &str, error: TokenError, expires_at: DateTime<Utc>) {
        self.slots.insert(
            token.to_string(),
            Slot {
                outcome: VerifyOutcome::Invalid(error),
                expires_at,
            },
        );
    }

    /// Drop a cached outcome, e.g. when a positive entry turns out to be
    /// revoked.
    pub fn remove(&self, token: &str) {
        self.slots.remove(token);
    }

    /// Sweep stale slots; called from the periodic cleanup job.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| now < slot.expires_at);
        before - self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
