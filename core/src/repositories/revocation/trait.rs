//! Revocation blacklist trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RevocationEntry;
use crate::errors::DomainError;

/// Durable set of revoked access-token identifiers (JTI).
///
/// Entries carry the token's own expiry so the sweep never needs to
/// cross-reference the token store. A lookup failure must surface as an
/// error (fail closed), not as "not revoked".
#[async_trait]
pub trait RevocationRepository: Send + Sync {
    /// Insert a blacklist entry. Inserting the same jti twice is not an
    /// error; revocation is idempotent.
    async fn insert(&self, entry: RevocationEntry) -> Result<(), DomainError>;

    /// Check whether a jti is blacklisted.
    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError>;

    /// Delete entries past expiry. Idempotent.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
