//! Main token service implementation

use std::sync::Arc;

use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::token::{
    Claims, RefreshToken, RevocationEntry, RevocationReason, TokenPair,
};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{
    RevocationRepository, SessionRepository, TokenRepository, UserRepository,
};
use crate::services::context::ClientContext;
use crate::services::hash::sha256_hex;

use super::cache::{VerifyCache, VerifyOutcome};
use super::config::TokenServiceConfig;

/// Service for access-token issuance/verification, refresh-token rotation
/// with family reuse detection, and blacklist revocation.
///
/// All store handles are injected at construction and held for the life of
/// the service; the service never reconnects on its own.
pub struct TokenService<T, V, S, U>
where
    T: TokenRepository,
    V: RevocationRepository,
    S: SessionRepository,
    U: UserRepository,
{
    tokens: Arc<T>,
    revocations: Arc<V>,
    sessions: Arc<S>,
    users: Arc<U>,
    cache: Arc<VerifyCache>,
    /// Per-token-hash rotation locks. Two concurrent refresh calls with
    /// the same value serialize here; the loser observes the revoked row
    /// and trips reuse detection.
    rotation_locks: DashMap<String, Arc<Mutex<()>>>,
    config: TokenServiceConfig,
    clock: Arc<dyn Clock>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<T, V, S, U> TokenService<T, V, S, U>
where
    T: TokenRepository,
    V: RevocationRepository,
    S: SessionRepository,
    U: UserRepository,
{
    /// Creates a new token service instance.
    pub fn new(
        tokens: Arc<T>,
        revocations: Arc<V>,
        sessions: Arc<S>,
        users: Arc<U>,
        config: TokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt.issuer]);
        validation.set_audience(&[&config.jwt.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            tokens,
            revocations,
            sessions,
            users,
            cache: Arc::new(VerifyCache::new()),
            rotation_locks: DashMap::new(),
            config,
            clock,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Shared handle to the verification cache, for the cleanup sweep.
    pub fn cache(&self) -> Arc<VerifyCache> {
        Arc::clone(&self.cache)
    }

    /// Issues a signed access token bound to a session.
    ///
    /// Pure issuance: a fresh jti, `iat = now`, `exp = iat + access
    /// lifetime`, fixed issuer/audience. No side effects beyond signing.
    pub fn issue(&self, user: &User, session_id: Uuid) -> DomainResult<(String, Claims)> {
        let claims = Claims::new_access_token(
            user.id,
            user.role.as_str().to_string(),
            user.permissions.clone(),
            session_id,
            self.clock.now(),
            self.config.access_lifetime(),
            &self.config.jwt.issuer,
            &self.config.jwt.audience,
        );
        let token = self.encode_jwt(&claims)?;
        Ok((token, claims))
    }

    /// Issues the short-lived restricted token handed out when a login is
    /// gated on a two-factor code.
    pub fn issue_pending_token(&self, user_id: Uuid) -> DomainResult<(String, i64)> {
        let claims = Claims::new_pending_token(
            user_id,
            self.clock.now(),
            self.config.pending_lifetime(),
            &self.config.jwt.issuer,
            &self.config.jwt.audience,
        );
        let token = self.encode_jwt(&claims)?;
        Ok((token, self.config.jwt.pending_token_expiry))
    }

    /// Decodes a two-factor pending token, rejecting full access tokens.
    pub fn decode_pending_token(&self, token: &str) -> DomainResult<Claims> {
        let claims = self.decode_jwt(token)?;
        if !claims.is_two_factor_pending() {
            return Err(TokenError::InvalidTokenFormat.into());
        }
        Ok(claims)
    }

    /// Verifies an access token and returns its claims.
    ///
    /// The cache only short-circuits signature/parse work: a cached
    /// negative outcome fails fast, and a cached positive outcome still
    /// re-checks expiry and the revocation blacklist so a token that
    /// expired or was revoked after caching is rejected even while its
    /// cache entry is warm.
    pub async fn verify(&self, token: &str) -> DomainResult<Claims> {
        let now = self.clock.now();

        if let Some(outcome) = self.cache.get(token, now) {
            return match outcome {
                VerifyOutcome::Invalid(error) => Err(error.into()),
                VerifyOutcome::Valid(claims) => {
                    // A warm slot can outlive the token's own exp claim
                    if now.timestamp() >= claims.exp {
                        self.cache.remove(token);
                        Err(TokenError::TokenExpired.into())
                    } else if self.revocations.is_revoked(&claims.jti).await? {
                        self.cache.remove(token);
                        Err(TokenError::TokenRevoked.into())
                    } else {
                        Ok(claims)
                    }
                }
            };
        }

        let claims = match self.decode_jwt(token) {
            Ok(claims) if claims.is_two_factor_pending() => {
                // A pending token is not an access token
                let error = TokenError::InvalidTokenFormat;
                self.cache
                    .insert_invalid(token, error.clone(), now + self.config.negative_cache_ttl());
                return Err(error.into());
            }
            Ok(claims) => claims,
            Err(error) => {
                self.cache
                    .insert_invalid(token, error.clone(), now + self.config.negative_cache_ttl());
                return Err(error.into());
            }
        };

        // Revoked outcomes are not cached; the blacklist stays the single
        // source of truth for revocation.
        if self.revocations.is_revoked(&claims.jti).await? {
            return Err(TokenError::TokenRevoked.into());
        }

        self.cache
            .insert_valid(token, claims.clone(), now + self.config.positive_cache_ttl());
        Ok(claims)
    }

    /// Creates and persists a refresh token in the given family, returning
    /// the raw opaque value (only the hash is stored).
    pub async fn create_refresh_token(
        &self,
        user_id: Uuid,
        family_id: Uuid,
        context: &ClientContext,
    ) -> DomainResult<String> {
        let value = generate_refresh_value();
        let row = RefreshToken::new(
            user_id,
            sha256_hex(&value),
            family_id,
            self.clock.now(),
            self.config.refresh_lifetime(),
        )
        .with_client(context.ip.clone(), context.user_agent.clone());

        self.tokens.save_refresh_token(row).await?;
        Ok(value)
    }

    /// Issues a full access/refresh pair for a fresh family, as happens at
    /// login. The refresh row is persisted; the access token is not.
    pub async fn issue_pair(
        &self,
        user: &User,
        session_id: Uuid,
        family_id: Uuid,
        context: &ClientContext,
    ) -> DomainResult<TokenPair> {
        let refresh_value = self
            .create_refresh_token(user.id, family_id, context)
            .await?;
        let (access_token, _claims) = self.issue(user, session_id)?;

        Ok(TokenPair::new(
            access_token,
            refresh_value,
            self.config.jwt.access_token_expiry,
            self.config.jwt.refresh_token_expiry,
        ))
    }

    /// Rotates a refresh token, returning a fresh access/refresh pair.
    ///
    /// Rotation is serialized per token value; the successor row is
    /// written before the predecessor is marked revoked, so a crash in
    /// between leaves the family with a usable token rather than none.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        context: &ClientContext,
    ) -> DomainResult<TokenPair> {
        let token_hash = sha256_hex(refresh_token);

        let lock = {
            self.rotation_locks
                .entry(token_hash.clone())
                .or_default()
                .clone()
        };
        let _guard = lock.lock().await;

        let result = self.rotate_locked(&token_hash, context).await;

        drop(_guard);
        // The row is revoked (or gone) by now; latecomers only ever
        // observe the revoked row, so the lock entry can be dropped.
        self.rotation_locks.remove(&token_hash);

        result
    }

    async fn rotate_locked(
        &self,
        token_hash: &str,
        context: &ClientContext,
    ) -> DomainResult<TokenPair> {
        let now = self.clock.now();

        let old_token = self
            .tokens
            .find_refresh_token(token_hash)
            .await?
            .ok_or(TokenError::InvalidRefreshToken)?;

        if old_token.is_revoked {
            // A rotated-out value came back: strong signal of token theft.
            // Invalidate everything ever derived from this chain, including
            // whatever the attacker may be holding, before reporting.
            let revoked = self.tokens.revoke_family(old_token.family_id, now).await?;
            warn!(
                family_id = %old_token.family_id,
                user_id = %old_token.user_id,
                tokens_revoked = revoked,
                ip = context.ip_or_unknown(),
                user_agent = context.user_agent_or_unknown(),
                "Refresh token reuse detected; family revoked"
            );
            return Err(TokenError::RefreshTokenReused.into());
        }

        if old_token.is_expired(now) {
            return Err(TokenError::TokenExpired.into());
        }

        let user = match self.users.find_by_id(old_token.user_id).await? {
            Some(user) if user.is_active => user,
            _ => {
                let revoked = self.tokens.revoke_family(old_token.family_id, now).await?;
                warn!(
                    family_id = %old_token.family_id,
                    user_id = %old_token.user_id,
                    tokens_revoked = revoked,
                    "Refresh attempted for inactive account; family revoked"
                );
                return Err(AuthError::AccountInactive.into());
            }
        };

        let session = match self.sessions.find_by_family(old_token.family_id).await? {
            Some(session) if session.is_live(now) => session,
            _ => {
                let revoked = self.tokens.revoke_family(old_token.family_id, now).await?;
                warn!(
                    family_id = %old_token.family_id,
                    user_id = %old_token.user_id,
                    tokens_revoked = revoked,
                    "Refresh attempted for a dead session; family revoked"
                );
                return Err(TokenError::InvalidRefreshToken.into());
            }
        };

        // Create-then-revoke: the successor exists before the predecessor
        // is marked, preserving one usable token per family across a crash.
        let new_value = generate_refresh_value();
        let new_row = RefreshToken::new(
            user.id,
            sha256_hex(&new_value),
            old_token.family_id,
            now,
            self.config.refresh_lifetime(),
        )
        .with_client(context.ip.clone(), context.user_agent.clone());
        let new_row = self.tokens.save_refresh_token(new_row).await?;

        self.tokens
            .revoke_token(token_hash, now, Some(new_row.id))
            .await?;

        let (access_token, _claims) = self.issue(&user, session.id)?;
        self.sessions.touch(session.id, now).await?;

        Ok(TokenPair::new(
            access_token,
            new_value,
            self.config.jwt.access_token_expiry,
            self.config.jwt.refresh_token_expiry,
        ))
    }

    /// Blacklists an access token; the entry inherits the token's own
    /// expiry so the sweep never needs cross-referencing.
    pub async fn revoke_access_token(
        &self,
        token: &str,
        reason: RevocationReason,
    ) -> DomainResult<()> {
        let claims = self.decode_jwt(token)?;
        let user_id = claims
            .user_id()
            .map_err(|_| TokenError::InvalidTokenFormat)?;
        let expires_at = claims.expires_at().ok_or(DomainError::Internal {
            message: "Invalid expiry timestamp".to_string(),
        })?;

        let entry = RevocationEntry::new(
            claims.jti,
            sha256_hex(token),
            user_id,
            expires_at,
            reason,
        );
        self.revocations.insert(entry).await
    }

    /// Revokes every token ever issued in a family.
    pub async fn revoke_family(&self, family_id: Uuid) -> DomainResult<usize> {
        self.tokens.revoke_family(family_id, self.clock.now()).await
    }

    /// Revokes all refresh tokens for a user, optionally sparing one
    /// family ("log out everywhere else").
    pub async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        except_family: Option<Uuid>,
    ) -> DomainResult<usize> {
        self.tokens
            .revoke_all_user_tokens(user_id, except_family, self.clock.now())
            .await
    }
}

impl<T, V, S, U> TokenService<T, V, S, U>
where
    T: TokenRepository,
    V: RevocationRepository,
    S: SessionRepository,
    U: UserRepository,
{
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> DomainResult<String> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| TokenError::TokenGenerationFailed.into())
    }

    fn decode_jwt(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::InvalidTokenFormat,
            })
    }
}

/// Generates an opaque refresh token value with 256 bits of entropy.
pub(crate) fn generate_refresh_value() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
