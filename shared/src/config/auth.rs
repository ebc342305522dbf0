//! Authentication and session policy configuration

use serde::{Deserialize, Serialize};

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// Expiry for the short-lived two-factor pending token in seconds
    #[serde(default = "default_pending_token_expiry")]
    pub pending_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from("development-secret-please-change-in-production"),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604_800, // 7 days
            pending_token_expiry: default_pending_token_expiry(),
            issuer: String::from("keystone"),
            audience: String::from("keystone-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86_400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "development-secret-please-change-in-production"
    }
}

/// Session lifecycle and concurrency policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionPolicyConfig {
    /// Session timeout in seconds
    pub timeout: i64,

    /// Maximum concurrent active sessions per user; the least-recently
    /// active sessions are deactivated when the ceiling is exceeded
    pub max_concurrent_sessions: usize,
}

impl Default for SessionPolicyConfig {
    fn default() -> Self {
        Self {
            timeout: 86_400, // 24 hours
            max_concurrent_sessions: 5,
        }
    }
}

/// Failed-login lockout policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Failed attempts within the window before the account locks
    pub max_failed_attempts: u32,

    /// Sliding window for counting failed attempts, in seconds
    pub window_seconds: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            window_seconds: 300, // 5 minutes
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Session policy configuration
    #[serde(default)]
    pub session: SessionPolicyConfig,

    /// Lockout policy configuration
    #[serde(default)]
    pub lockout: LockoutConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "development-secret-please-change-in-production".to_string());
        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900);
        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(604_800);
        let session_timeout = std::env::var("SESSION_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);
        let max_concurrent_sessions = std::env::var("MAX_CONCURRENT_SESSIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_expiry,
                refresh_token_expiry,
                ..Default::default()
            },
            session: SessionPolicyConfig {
                timeout: session_timeout,
                max_concurrent_sessions,
            },
            lockout: LockoutConfig::default(),
        }
    }
}

fn default_pending_token_expiry() -> i64 {
    300 // 5 minutes
}
