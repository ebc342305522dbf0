//! Token service test suites and shared fixtures.

mod service_tests;

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::domain::clock::{Clock, FixedClock};
use crate::domain::entities::session::Session;
use crate::domain::entities::user::{User, UserRole};
use crate::repositories::{
    InMemoryRevocationRepository, InMemorySessionRepository, InMemoryTokenRepository,
    InMemoryUserRepository, SessionRepository,
};
use crate::services::context::ClientContext;
use crate::services::token::{TokenService, TokenServiceConfig};

type TestTokenService = TokenService<
    InMemoryTokenRepository,
    InMemoryRevocationRepository,
    InMemorySessionRepository,
    InMemoryUserRepository,
>;

/// Fully in-memory token service with a settable clock.
pub(crate) struct Harness {
    pub tokens: Arc<InMemoryTokenRepository>,
    pub revocations: Arc<InMemoryRevocationRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub clock: Arc<FixedClock>,
    pub service: Arc<TestTokenService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(TokenServiceConfig::default())
    }

    pub fn with_config(config: TokenServiceConfig) -> Self {
        let tokens = Arc::new(InMemoryTokenRepository::new());
        let revocations = Arc::new(InMemoryRevocationRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let clock = Arc::new(FixedClock::at_now());

        let service = Arc::new(TokenService::new(
            Arc::clone(&tokens),
            Arc::clone(&revocations),
            Arc::clone(&sessions),
            Arc::clone(&users),
            config,
            clock.clone(),
        ));

        Self {
            tokens,
            revocations,
            sessions,
            users,
            clock,
            service,
        }
    }

    pub async fn seed_user(&self) -> User {
        let user = User::new("ada@example.com", "$2b$04$unused", UserRole::Member);
        self.users.insert(user.clone()).await;
        user
    }

    /// Opens a session tied to a fresh family, as login would.
    pub async fn open_session(&self, user_id: Uuid) -> Session {
        let session = Session::new(
            user_id,
            Uuid::new_v4().to_string(),
            Uuid::new_v4(),
            self.clock.now(),
            Duration::hours(24),
        );
        self.sessions.create(session).await.unwrap()
    }

    /// Session plus a persisted refresh token in its family.
    pub async fn login(&self, user: &User) -> (Session, String) {
        let session = self.open_session(user.id).await;
        let refresh = self
            .service
            .create_refresh_token(user.id, session.family_id, &ctx())
            .await
            .unwrap();
        (session, refresh)
    }
}

pub(crate) fn ctx() -> ClientContext {
    ClientContext::new("203.0.113.7", "keystone-tests/1.0")
}
