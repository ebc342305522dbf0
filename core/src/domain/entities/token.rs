//! Token entities: JWT claims, refresh tokens and revocation entries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope claim carried by the short-lived token handed out when a login is
/// gated on a two-factor code. A token carrying this scope never passes
/// full verification.
pub const TWO_FACTOR_PENDING_SCOPE: &str = "two_factor_pending";

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Role of the user at issuance time
    pub role: String,

    /// Permission set snapshot at issuance time
    pub permissions: Vec<String>,

    /// Session this token is bound to
    pub sid: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Restricted scope, if any (e.g. two-factor pending)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Claims {
    /// Creates claims for an access token bound to a session.
    ///
    /// The jti is freshly generated per issuance; `exp = iat + lifetime`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_access_token(
        user_id: Uuid,
        role: String,
        permissions: Vec<String>,
        session_id: Uuid,
        now: DateTime<Utc>,
        lifetime: Duration,
        issuer: &str,
        audience: &str,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            role,
            permissions,
            sid: session_id.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            scope: None,
        }
    }

    /// Creates claims for a two-factor pending token. It carries the
    /// restricted scope and is only accepted by the two-factor completion
    /// path, never by `verify`.
    pub fn new_pending_token(
        user_id: Uuid,
        now: DateTime<Utc>,
        lifetime: Duration,
        issuer: &str,
        audience: &str,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            role: String::new(),
            permissions: Vec::new(),
            sid: String::new(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            scope: Some(TWO_FACTOR_PENDING_SCOPE.to_string()),
        }
    }

    /// Whether this is a restricted two-factor pending token.
    pub fn is_two_factor_pending(&self) -> bool {
        self.scope.as_deref() == Some(TWO_FACTOR_PENDING_SCOPE)
    }

    /// Expiry of the claims as a `DateTime`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Gets the session ID from the claims
    pub fn session_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sid)
    }
}

/// Refresh token entity stored in the database.
///
/// Rows persist after revocation (marked, not deleted) so that reuse of a
/// rotated-out value can be detected and audited; expired rows are purged
/// by the periodic cleanup sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the refresh token
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// Hashed token value; the raw opaque value is never stored
    pub token_hash: String,

    /// Family this token belongs to; one family per login, every rotation
    /// stays inside the family
    pub family_id: Uuid,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub is_revoked: bool,

    /// When the token was revoked, if it was
    pub revoked_at: Option<DateTime<Utc>>,

    /// The token that superseded this one on rotation. Immutable once set.
    pub replaced_by: Option<Uuid>,

    /// Client IP at issuance, for reuse-detection auditing
    pub issued_ip: Option<String>,

    /// Client user agent at issuance, for reuse-detection auditing
    pub issued_user_agent: Option<String>,
}

impl RefreshToken {
    /// Creates a new refresh token row in the given family.
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        family_id: Uuid,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            family_id,
            created_at: now,
            expires_at: now + lifetime,
            is_revoked: false,
            revoked_at: None,
            replaced_by: None,
            issued_ip: None,
            issued_user_agent: None,
        }
    }

    /// Attach the issuing client context.
    pub fn with_client(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.issued_ip = ip;
        self.issued_user_agent = user_agent;
        self
    }

    /// Checks if the refresh token has expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// A token is active if it is neither revoked nor expired. The family
    /// invariant is that at most one token per family is active.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired(now)
    }

    /// Marks the token revoked, optionally recording its successor.
    /// `replaced_by` is only written on first revocation.
    pub fn revoke(&mut self, at: DateTime<Utc>, replaced_by: Option<Uuid>) {
        if self.is_revoked {
            return;
        }
        self.is_revoked = true;
        self.revoked_at = Some(at);
        self.replaced_by = replaced_by;
    }
}

/// Reason a token identifier was blacklisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    Logout,
    Compromised,
    PasswordChanged,
    AdminAction,
}

/// Blacklist entry for a revoked access token.
///
/// Carries the token's own expiry so the entry can be garbage-collected
/// without cross-referencing the token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// JWT ID of the revoked token
    pub jti: String,

    /// Hash of the raw token string
    pub token_hash: String,

    /// Owning user
    pub user_id: Uuid,

    /// Mirrors the token's own exp claim
    pub expires_at: DateTime<Utc>,

    /// Why the token was revoked
    pub reason: RevocationReason,
}

impl RevocationEntry {
    pub fn new(
        jti: String,
        token_hash: String,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
        reason: RevocationReason,
    ) -> Self {
        Self {
            jti,
            token_hash,
            user_id,
            expires_at,
            reason,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Token pair returned to the client after login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token value
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_for(user_id: Uuid, session_id: Uuid, now: DateTime<Utc>) -> Claims {
        Claims::new_access_token(
            user_id,
            "member".to_string(),
            vec!["profile:read".to_string()],
            session_id,
            now,
            Duration::minutes(15),
            "keystone",
            "keystone-api",
        )
    }

    #[test]
    fn test_access_token_claims() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = claims_for(user_id, session_id, now);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.sid, session_id.to_string());
        assert_eq!(claims.iss, "keystone");
        assert_eq!(claims.aud, "keystone-api");
        assert_eq!(claims.exp, (now + Duration::minutes(15)).timestamp());
        assert!(!claims.is_two_factor_pending());
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.session_id().unwrap(), session_id);
    }

    #[test]
    fn test_jti_unique_per_issuance() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let a = claims_for(user_id, session_id, now);
        let b = claims_for(user_id, session_id, now);

        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_pending_token_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new_pending_token(
            user_id,
            Utc::now(),
            Duration::minutes(5),
            "keystone",
            "keystone-api",
        );

        assert!(claims.is_two_factor_pending());
        assert!(claims.sid.is_empty());
    }

    #[test]
    fn test_refresh_token_lifecycle() {
        let now = Utc::now();
        let family = Uuid::new_v4();
        let mut token = RefreshToken::new(
            Uuid::new_v4(),
            "hash".to_string(),
            family,
            now,
            Duration::days(7),
        );

        assert!(token.is_active(now));
        assert!(!token.is_expired(now));

        let successor = Uuid::new_v4();
        token.revoke(now, Some(successor));

        assert!(token.is_revoked);
        assert_eq!(token.revoked_at, Some(now));
        assert_eq!(token.replaced_by, Some(successor));
        assert!(!token.is_active(now));
    }

    #[test]
    fn test_replaced_by_immutable_after_revocation() {
        let now = Utc::now();
        let mut token = RefreshToken::new(
            Uuid::new_v4(),
            "hash".to_string(),
            Uuid::new_v4(),
            now,
            Duration::days(7),
        );

        let successor = Uuid::new_v4();
        token.revoke(now, Some(successor));
        token.revoke(now + Duration::seconds(5), Some(Uuid::new_v4()));

        assert_eq!(token.replaced_by, Some(successor));
        assert_eq!(token.revoked_at, Some(now));
    }

    #[test]
    fn test_refresh_token_expiration() {
        let now = Utc::now();
        let token = RefreshToken::new(
            Uuid::new_v4(),
            "hash".to_string(),
            Uuid::new_v4(),
            now,
            Duration::days(7),
        );

        assert!(token.is_expired(now + Duration::days(8)));
        assert!(!token.is_active(now + Duration::days(8)));
    }

    #[test]
    fn test_revocation_entry_expiry_mirrors_token() {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(15);
        let entry = RevocationEntry::new(
            Uuid::new_v4().to_string(),
            "token_hash".to_string(),
            Uuid::new_v4(),
            expires_at,
            RevocationReason::Logout,
        );

        assert!(!entry.is_expired(now));
        assert!(entry.is_expired(expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_claims_serialization() {
        let claims = claims_for(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        let json = serde_json::to_string(&claims).unwrap();
        let deserialized: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims, deserialized);
        // scope is omitted when absent
        assert!(!json.contains("scope"));
    }
}
