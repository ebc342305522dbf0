//! User repository trait.
//!
//! The authentication core only reads accounts; creation and profile
//! management belong to the user-facing CRUD layer outside this crate.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Read-only user lookups needed by the authentication flows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by email (case-insensitive match on the stored value).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
}
