//! Authentication service test suites and fixtures.


use std::sync::Arc;

use crate::domain::clock::FixedClock;
use crate::domain::entities::user::{User, UserRole};
use crate::repositories::{
    InMemoryRevocationRepository, InMemorySessionRepository, InMemoryTokenRepository,
    InMemoryUserRepository,
};
use crate::services::auth::{AuthService, AuthServiceConfig, Credentials, LoginOutcome, LoginSession};
use crate::services::context::ClientContext;
use crate::services::session::SessionService;
use crate::services::token::{TokenService, TokenServiceConfig};

use ks_shared::config::{LockoutConfig, SessionPolicyConfig};

use mocks::{PlainTextVerifier, StaticTotp};

type TestAuthService = AuthService<
    InMemoryTokenRepository,
    InMemoryRevocationRepository,
    InMemorySessionRepository,
    InMemoryUserRepository,
    PlainTextVerifier,
    StaticTotp,
>;

const GOOD_TOTP: &str = "123456";

pub(crate) struct Harness {
    pub users: Arc<InMemoryUserRepository>,
    pub tokens: Arc<InMemoryTokenRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub clock: Arc<FixedClock>,
    pub service: TestAuthService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(3, 2)
    }

    pub fn with_policy(max_failed_attempts: u32, max_sessions: usize) -> Self {
        let tokens = Arc::new(InMemoryTokenRepository::new());
        let revocations = Arc::new(InMemoryRevocationRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let clock = Arc::new(FixedClock::at_now());

        let config = AuthServiceConfig {
            lockout: LockoutConfig {
                max_failed_attempts,
                window_seconds: 300,
            },
            session: SessionPolicyConfig {
                timeout: 86_400,
                max_concurrent_sessions: max_sessions,
            },
            totp_window: 1,
        };

        let token_service = Arc::new(TokenService::new(
            Arc::clone(&tokens),
            Arc::clone(&revocations),
            Arc::clone(&sessions),
            Arc::clone(&users),
            TokenServiceConfig::default(),
            clock.clone(),
        ));
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&sessions),
            config.session.clone(),
            clock.clone(),
        ));

        let service = AuthService::new(
            Arc::clone(&users),
            token_service,
            session_service,
            Arc::new(PlainTextVerifier),
            Arc::new(StaticTotp { accept: GOOD_TOTP }),
            config,
            clock.clone(),
        );

        Self {
            users,
            tokens,
            sessions,
            clock,
            service,
        }
    }

    pub async fn seed_user(&self, email: &str, password: &str) -> User {
        let user = User::new(email, PlainTextVerifier::hash_of(password), UserRole::Member);
        self.users.insert(user.clone()).await;
        user
    }

    pub async fn seed_totp_user(&self, email: &str, password: &str) -> User {
        let mut user = User::new(email, PlainTextVerifier::hash_of(password), UserRole::Member);
        user.totp_secret = Some("JBSWY3DPEHPK3PXP".to_string());
        self.users.insert(user.clone()).await;
        user
    }

    /// Login that is expected to succeed outright.
    pub async fn login_ok(&self, email: &str, password: &str) -> LoginSession {
        match self
            .service
            .login(&Credentials::new(email, password), &ctx())
            .await
            .unwrap()
        {
            LoginOutcome::Success(session) => session,
            LoginOutcome::TwoFactorRequired { .. } => {
                panic!("expected a direct login, got a two-factor challenge")
            }
        }
    }
}

pub(crate) fn ctx() -> ClientContext {
    ClientContext::new("203.0.113.7", "keystone-tests/1.0")
}
