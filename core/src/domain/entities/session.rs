//! Session entity: one row per login, linked to a refresh-token family.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User session created at login.
///
/// A session and its refresh-token family are created together; the
/// session ends when explicitly terminated, superseded by the concurrency
/// ceiling, or past `expires_at`. Terminal states are final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Hash of the opaque session token handed to the client
    pub token_hash: String,

    /// Refresh-token family created at the same login
    pub family_id: Uuid,

    /// Client IP at login
    pub ip_address: Option<String>,

    /// Client user agent at login
    pub user_agent: Option<String>,

    /// Coarse location derived at login, if available
    pub location: Option<String>,

    /// Whether the session is active
    pub is_active: bool,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,

    /// Last observed activity. Monotonically non-decreasing while active.
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        family_id: Uuid,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            family_id,
            ip_address: None,
            user_agent: None,
            location: None,
            is_active: true,
            created_at: now,
            expires_at: now + timeout,
            last_active_at: now,
        }
    }

    /// Attach the client context observed at login.
    pub fn with_client(
        mut self,
        ip: Option<String>,
        user_agent: Option<String>,
        location: Option<String>,
    ) -> Self {
        self.ip_address = ip;
        self.user_agent = user_agent;
        self.location = location;
        self
    }

    /// Whether the session counts as active at the given instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now <= self.expires_at
    }

    /// Records activity. `last_active_at` never moves backwards, so a
    /// stale writer cannot undo a newer observation.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        if self.is_active && at > self.last_active_at {
            self.last_active_at = at;
        }
    }

    /// Moves the session to a terminal state. No transition back.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
