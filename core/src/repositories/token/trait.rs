//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations.
///
/// Tokens are stored hashed; revoked rows are kept (marked) rather than
/// deleted so that reuse of a rotated-out value can be detected, and are
/// purged by the periodic cleanup sweep once expired.
///
/// # Consistency
/// Rotation relies on `save_refresh_token` for the successor completing
/// before `revoke_token` on the predecessor; a durable implementation
/// should expose both inside one transaction. Store failures must surface
/// as errors (fail closed), never as "token valid".
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token row.
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError)` - Save failed (e.g. duplicate hash)
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value.
    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, DomainError>;

    /// Find every token ever issued in a family, regardless of state.
    async fn find_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Revoke a specific refresh token, recording its successor when the
    /// revocation is part of a rotation.
    ///
    /// # Returns
    /// * `Ok(true)` - Token was revoked
    /// * `Ok(false)` - Token not found or already revoked
    async fn revoke_token(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
        replaced_by: Option<Uuid>,
    ) -> Result<bool, DomainError>;

    /// Revoke every token ever issued in a family. This is the reuse
    /// response: it must cover already-revoked chains' descendants too.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens newly revoked
    async fn revoke_family(
        &self,
        family_id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Revoke all refresh tokens for a user, optionally sparing one family
    /// (the "log out everywhere else" flow).
    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        except_family: Option<Uuid>,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Delete refresh token rows past expiry. Idempotent.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
