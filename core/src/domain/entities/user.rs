//! Minimal user entity consumed by login and refresh-time active checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Manager,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Manager => "manager",
            UserRole::Admin => "admin",
        }
    }
}

/// User account as seen by the authentication core. Password hashing and
/// account CRUD live elsewhere; this crate only reads the fields needed to
/// authenticate and to gate refresh on account state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
    /// TOTP secret when two-factor is enrolled
    pub totp_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            permissions: Vec::new(),
            is_active: true,
            totp_secret: None,
            created_at: Utc::now(),
        }
    }

    /// Whether two-factor authentication is enrolled for this account.
    pub fn has_two_factor(&self) -> bool {
        self.totp_secret.is_some()
    }
}
