//! In-memory implementation of SessionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::Session;
use crate::errors::DomainError;

use super::r#trait::SessionRepository;

/// In-memory session store keyed by session ID.
#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> Result<Session, DomainError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id).cloned())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn find_by_family(&self, family_id: Uuid) -> Result<Option<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.family_id == family_id)
            .cloned())
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_live(now))
            .cloned()
            .collect())
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(&id) {
            Some(session) if session.is_active => {
                session.touch(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(&id) {
            Some(session) if session.is_active => {
                session.deactivate();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate_all_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
    ) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let mut count = 0;

        for session in sessions.values_mut() {
            if session.user_id == user_id && Some(session.id) != except && session.is_active {
                session.deactivate();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        sessions.retain(|_, session| now <= session.expires_at);

        Ok(initial_count - sessions.len())
    }

    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        sessions.retain(|_, session| session.is_active || session.last_active_at >= cutoff);

        Ok(initial_count - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session_for(user_id: Uuid, now: DateTime<Utc>) -> Session {
        Session::new(
            user_id,
            Uuid::new_v4().to_string(),
            Uuid::new_v4(),
            now,
            Duration::hours(24),
        )
    }

    #[tokio::test]
    async fn test_find_active_excludes_expired_and_terminated() {
        let repo = InMemorySessionRepository::new();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let live = repo.create(session_for(user, now)).await.unwrap();
        let terminated = repo.create(session_for(user, now)).await.unwrap();
        repo.deactivate(terminated.id).await.unwrap();
        let mut expired = session_for(user, now);
        expired.expires_at = now - Duration::hours(1);
        repo.create(expired).await.unwrap();

        let active = repo.find_active_by_user(user, now).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, live.id);
    }

    #[tokio::test]
    async fn test_deactivate_is_one_way() {
        let repo = InMemorySessionRepository::new();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let session = repo.create(session_for(user, now)).await.unwrap();
        assert!(repo.deactivate(session.id).await.unwrap());
        assert!(!repo.deactivate(session.id).await.unwrap());
        assert!(!repo.touch(session.id, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_deactivate_all_spares_excepted() {
        let repo = InMemorySessionRepository::new();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let keep = repo.create(session_for(user, now)).await.unwrap();
        repo.create(session_for(user, now)).await.unwrap();
        repo.create(session_for(user, now)).await.unwrap();

        let dropped = repo
            .deactivate_all_for_user(user, Some(keep.id))
            .await
            .unwrap();
        assert_eq!(dropped, 2);

        let active = repo.find_active_by_user(user, now).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_delete_inactive_before_keeps_recent_rows() {
        let repo = InMemorySessionRepository::new();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let stale = repo.create(session_for(user, now)).await.unwrap();
        repo.deactivate(stale.id).await.unwrap();

        // Cutoff in the past keeps the row; cutoff in the future sweeps it
        assert_eq!(
            repo.delete_inactive_before(now - Duration::days(1))
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            repo.delete_inactive_before(now + Duration::days(1))
                .await
                .unwrap(),
            1
        );
    }
}
