//! Session repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::Session;
use crate::errors::DomainError;

/// Repository trait for Session entity persistence operations.
///
/// Deactivation is one-way: once a row's active flag drops it never comes
/// back. `touch` must keep `last_active_at` monotonically non-decreasing.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session row.
    async fn create(&self, session: Session) -> Result<Session, DomainError>;

    /// Find a session by its ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Find a session by the hash of its opaque token.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, DomainError>;

    /// Find the session created alongside a refresh-token family. Session
    /// and family are created together at login, so this is one-to-one.
    async fn find_by_family(&self, family_id: Uuid) -> Result<Option<Session>, DomainError>;

    /// All sessions for a user that are active and unexpired at `now`.
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, DomainError>;

    /// Record activity on a session.
    ///
    /// # Returns
    /// * `Ok(true)` - Session found and active
    /// * `Ok(false)` - Session missing or already terminal
    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Move a session to a terminal state.
    ///
    /// # Returns
    /// * `Ok(true)` - Session was active and is now deactivated
    /// * `Ok(false)` - Session missing or already terminal
    async fn deactivate(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Deactivate all of a user's sessions, optionally sparing one.
    async fn deactivate_all_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
    ) -> Result<usize, DomainError>;

    /// Delete rows past expiry. Idempotent.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Delete inactive rows whose last activity predates `cutoff`.
    /// Idempotent.
    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
