//! Authentication service implementation

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::session::Session;
use crate::domain::entities::token::{Claims, RevocationReason, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainResult};
use crate::repositories::{
    RevocationRepository, SessionRepository, TokenRepository, UserRepository,
};
use crate::services::context::ClientContext;
use crate::services::session::SessionService;
use crate::services::token::TokenService;

use super::config::AuthServiceConfig;
use super::credentials::{dummy_hash, PasswordVerifier, TotpVerifier};
use super::lockout::LockoutTracker;

/// Login credentials as presented by the caller.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Everything a successful login hands back.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub tokens: TokenPair,
    pub session: Session,
    /// Raw opaque session token; only its hash is stored.
    pub session_token: String,
}

/// Result of a login attempt that passed the credential check.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Fully authenticated; tokens and session are live.
    Success(LoginSession),
    /// Credentials were correct but the account requires a second factor.
    /// The pending token authorizes only `complete_two_factor`.
    TwoFactorRequired {
        pending_token: String,
        expires_in: i64,
    },
}

/// Service orchestrating the full authentication lifecycle: login with
/// lockout and two-factor gating, session establishment, logout, and the
/// session management surface.
pub struct AuthService<T, V, S, U, P, F>
where
    T: TokenRepository,
    V: RevocationRepository,
    S: SessionRepository,
    U: UserRepository,
    P: PasswordVerifier,
    F: TotpVerifier,
{
    users: Arc<U>,
    token_service: Arc<TokenService<T, V, S, U>>,
    session_service: Arc<SessionService<S>>,
    passwords: Arc<P>,
    totp: Arc<F>,
    lockout: LockoutTracker,
    config: AuthServiceConfig,
    clock: Arc<dyn Clock>,
}

impl<T, V, S, U, P, F> AuthService<T, V, S, U, P, F>
where
    T: TokenRepository,
    V: RevocationRepository,
    S: SessionRepository,
    U: UserRepository,
    P: PasswordVerifier,
    F: TotpVerifier,
{
    pub fn new(
        users: Arc<U>,
        token_service: Arc<TokenService<T, V, S, U>>,
        session_service: Arc<SessionService<S>>,
        passwords: Arc<P>,
        totp: Arc<F>,
        config: AuthServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lockout = LockoutTracker::new(config.lockout.clone());
        Self {
            users,
            token_service,
            session_service,
            passwords,
            totp,
            lockout,
            config,
            clock,
        }
    }

    /// Authenticates credentials and establishes a session.
    ///
    /// The lockout gate runs before any credential work, so a locked
    /// account rejects even a correct password. Unknown emails take the
    /// same hashing path as wrong passwords.
    pub async fn login(
        &self,
        credentials: &Credentials,
        context: &ClientContext,
    ) -> DomainResult<LoginOutcome> {
        let now = self.clock.now();
        let key = credentials.email.trim().to_lowercase();

        if self.lockout.is_locked(&key, now) {
            warn!(email = %key, "Login rejected: account locked");
            return Err(AuthError::AccountLocked.into());
        }

        let user = match self.users.find_by_email(&key).await? {
            Some(user) => user,
            None => {
                // Burn the same hashing cost as the known-account path.
                self.passwords.verify(&credentials.password, dummy_hash());
                self.lockout.record_failure(&key, now);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self
            .passwords
            .verify(&credentials.password, &user.password_hash)
        {
            self.lockout.record_failure(&key, now);
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        if user.has_two_factor() {
            let (pending_token, expires_in) = self.token_service.issue_pending_token(user.id)?;
            info!(user_id = %user.id, "Login pending second factor");
            return Ok(LoginOutcome::TwoFactorRequired {
                pending_token,
                expires_in,
            });
        }

        self.lockout.clear(&key);
        let session = self.establish_session(&user, context).await?;
        Ok(LoginOutcome::Success(session))
    }

    /// Completes a two-factor login from a pending token and a code.
    pub async fn complete_two_factor(
        &self,
        pending_token: &str,
        code: &str,
        context: &ClientContext,
    ) -> DomainResult<LoginSession> {
        let now = self.clock.now();
        let claims = self.token_service.decode_pending_token(pending_token)?;
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidCredentials)?;

        let user = match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => user,
            Some(_) => return Err(AuthError::AccountInactive.into()),
            None => return Err(AuthError::InvalidCredentials.into()),
        };

        let secret = user
            .totp_secret
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        let key = user.email.to_lowercase();
        if self.lockout.is_locked(&key, now) {
            warn!(email = %key, "Two-factor rejected: account locked");
            return Err(AuthError::AccountLocked.into());
        }

        if !self.totp.verify(secret, code, self.config.totp_window) {
            self.lockout.record_failure(&key, now);
            return Err(AuthError::InvalidTwoFactorCode.into());
        }

        self.lockout.clear(&key);
        self.establish_session(&user, context).await
    }

    /// Creates the session row, refresh-token family and token pair for an
    /// authenticated user, then enforces the concurrency ceiling. The new
    /// session is never the one evicted.
    async fn establish_session(
        &self,
        user: &User,
        context: &ClientContext,
    ) -> DomainResult<LoginSession> {
        let family_id = Uuid::new_v4();

        let (session, session_token) = self
            .session_service
            .create_session(user.id, family_id, context)
            .await?;

        self.session_service
            .enforce_session_limit(
                user.id,
                self.config.session.max_concurrent_sessions,
                Some(session.id),
            )
            .await?;

        let tokens = self
            .token_service
            .issue_pair(user, session.id, family_id, context)
            .await?;

        info!(user_id = %user.id, session_id = %session.id, "Login successful");
        Ok(LoginSession {
            tokens,
            session,
            session_token,
        })
    }

    /// Ends a session. Deactivation is unconditional; revoking the token
    /// family and blacklisting the presented access token are best-effort,
    /// retried once and then logged rather than surfaced.
    pub async fn logout(
        &self,
        session_token: &str,
        access_token: Option<&str>,
    ) -> DomainResult<()> {
        let session = self.session_service.find_by_token(session_token).await?;
        self.session_service.terminate_session(session.id).await?;

        if let Err(first) = self.token_service.revoke_family(session.family_id).await {
            warn!(
                session_id = %session.id,
                family_id = %session.family_id,
                error = %first,
                "Family revocation failed during logout; retrying"
            );
            if let Err(second) = self.token_service.revoke_family(session.family_id).await {
                warn!(
                    session_id = %session.id,
                    family_id = %session.family_id,
                    error = %second,
                    "Family revocation failed twice during logout; session is dead, tokens expire naturally"
                );
            }
        }

        if let Some(token) = access_token {
            if let Err(error) = self
                .token_service
                .revoke_access_token(token, RevocationReason::Logout)
                .await
            {
                warn!(
                    session_id = %session.id,
                    error = %error,
                    "Access token blacklisting failed during logout"
                );
            }
        }

        info!(session_id = %session.id, user_id = %session.user_id, "Logout complete");
        Ok(())
    }

    /// Rotates a refresh token.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        context: &ClientContext,
    ) -> DomainResult<TokenPair> {
        self.token_service.refresh(refresh_token, context).await
    }

    /// Verifies an access token.
    pub async fn verify(&self, access_token: &str) -> DomainResult<Claims> {
        self.token_service.verify(access_token).await
    }

    /// Kills every session and refresh-token family for a user, optionally
    /// sparing the session behind the given token ("everywhere else").
    pub async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        except_session_token: Option<&str>,
    ) -> DomainResult<usize> {
        let spared = match except_session_token {
            Some(token) => Some(self.session_service.find_by_token(token).await?),
            None => None,
        };

        let sessions_closed = self
            .session_service
            .terminate_all_for_user(user_id, spared.as_ref().map(|s| s.id))
            .await?;
        let tokens_revoked = self
            .token_service
            .revoke_all_for_user(user_id, spared.as_ref().map(|s| s.family_id))
            .await?;

        info!(
            user_id = %user_id,
            sessions_closed = sessions_closed,
            tokens_revoked = tokens_revoked,
            "Global revocation complete"
        );
        Ok(sessions_closed)
    }

    /// Active, unexpired sessions for a user.
    pub async fn get_active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<Session>> {
        self.session_service.get_active_sessions(user_id).await
    }

    /// Terminates one session by ID.
    pub async fn terminate_session(&self, session_id: Uuid) -> DomainResult<()> {
        self.session_service.terminate_session(session_id).await
    }

    /// Sessions flagged by the multiple-IP heuristic.
    pub async fn find_suspicious_sessions(&self, user_id: Uuid) -> DomainResult<Vec<Session>> {
        self.session_service.find_suspicious_sessions(user_id).await
    }

    /// Failed attempts currently counted against an email.
    pub fn failed_attempts(&self, email: &str) -> u32 {
        self.lockout
            .failed_attempts(&email.trim().to_lowercase(), self.clock.now())
    }
}
