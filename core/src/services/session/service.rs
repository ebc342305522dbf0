//! Session service implementation

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use rand::RngCore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::session::Session;
use crate::errors::{DomainResult, SessionError};
use crate::repositories::SessionRepository;
use crate::services::context::ClientContext;
use crate::services::hash::sha256_hex;

use ks_shared::config::SessionPolicyConfig;

/// Service managing session rows and the concurrency policy.
pub struct SessionService<S: SessionRepository> {
    sessions: Arc<S>,
    config: SessionPolicyConfig,
    clock: Arc<dyn Clock>,
}

impl<S: SessionRepository> SessionService<S> {
    pub fn new(sessions: Arc<S>, config: SessionPolicyConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            config,
            clock,
        }
    }

    /// Creates a session linked to a refresh-token family, returning the
    /// row and the raw opaque session token (only the hash is stored).
    pub async fn create_session(
        &self,
        user_id: Uuid,
        family_id: Uuid,
        context: &ClientContext,
    ) -> DomainResult<(Session, String)> {
        let token = generate_session_token();
        let session = Session::new(
            user_id,
            sha256_hex(&token),
            family_id,
            self.clock.now(),
            Duration::seconds(self.config.timeout),
        )
        .with_client(
            context.ip.clone(),
            context.user_agent.clone(),
            context.location.clone(),
        );

        let session = self.sessions.create(session).await?;
        info!(session_id = %session.id, user_id = %user_id, "Session created");
        Ok((session, token))
    }

    /// Deactivates the least-recently-active sessions above the ceiling.
    ///
    /// The protected session (the one just created) is never evicted. Ties
    /// on `last_active_at` break by creation time, oldest first.
    pub async fn enforce_session_limit(
        &self,
        user_id: Uuid,
        max_sessions: usize,
        protected: Option<Uuid>,
    ) -> DomainResult<usize> {
        let now = self.clock.now();
        let mut active = self.sessions.find_active_by_user(user_id, now).await?;

        if active.len() <= max_sessions {
            return Ok(0);
        }

        active.sort_by_key(|s| (s.last_active_at, s.created_at));

        let mut to_evict = active.len() - max_sessions;
        let mut evicted = 0;
        for session in active {
            if to_evict == 0 {
                break;
            }
            if Some(session.id) == protected {
                continue;
            }
            if self.sessions.deactivate(session.id).await? {
                evicted += 1;
            }
            to_evict -= 1;
        }

        if evicted > 0 {
            warn!(
                user_id = %user_id,
                evicted = evicted,
                max_sessions = max_sessions,
                "Session ceiling enforced; least-recently-active sessions deactivated"
            );
        }
        Ok(evicted)
    }

    /// All of a user's sessions that are active and unexpired right now.
    pub async fn get_active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<Session>> {
        self.sessions
            .find_active_by_user(user_id, self.clock.now())
            .await
    }

    /// Looks up a session by its raw opaque token.
    pub async fn find_by_token(&self, token: &str) -> DomainResult<Session> {
        self.sessions
            .find_by_token_hash(&sha256_hex(token))
            .await?
            .ok_or_else(|| SessionError::SessionNotFound.into())
    }

    /// Terminates a session by ID. Terminal states are final.
    pub async fn terminate_session(&self, session_id: Uuid) -> DomainResult<()> {
        if self.sessions.deactivate(session_id).await? {
            info!(session_id = %session_id, "Session terminated");
            Ok(())
        } else {
            Err(SessionError::SessionNotFound.into())
        }
    }

    /// Deactivates all of a user's sessions, optionally sparing one.
    pub async fn terminate_all_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
    ) -> DomainResult<usize> {
        self.sessions.deactivate_all_for_user(user_id, except).await
    }

    /// Records activity on a session.
    pub async fn touch(&self, session_id: Uuid) -> DomainResult<bool> {
        self.sessions.touch(session_id, self.clock.now()).await
    }

    /// Flags sessions worth a second look: when a user's active sessions
    /// span more than one distinct IP, all of them are surfaced as
    /// candidates. Advisory only; nothing is revoked here.
    pub async fn find_suspicious_sessions(&self, user_id: Uuid) -> DomainResult<Vec<Session>> {
        let active = self
            .sessions
            .find_active_by_user(user_id, self.clock.now())
            .await?;

        let distinct_ips: HashSet<&str> = active
            .iter()
            .filter_map(|s| s.ip_address.as_deref())
            .collect();

        if distinct_ips.len() > 1 {
            Ok(active)
        } else {
            Ok(Vec::new())
        }
    }

    /// Ceiling from the configured policy.
    pub fn max_concurrent_sessions(&self) -> usize {
        self.config.max_concurrent_sessions
    }
}

/// Generates an opaque session token value with 256 bits of entropy.
fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
