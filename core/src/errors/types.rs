//! Error type definitions for authentication, token and session operations.
//!
//! All of these are expected business outcomes returned as typed results;
//! translation to HTTP status codes happens at the API boundary, outside
//! this crate.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong email or password. Deliberately indistinguishable between an
    /// unknown email and a bad password to prevent account enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked due to repeated failed attempts")]
    AccountLocked,

    #[error("Account inactive")]
    AccountInactive,

    #[error("Two-factor code invalid")]
    InvalidTwoFactorCode,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// A rotated-out refresh token was presented again. The whole family
    /// has already been revoked by the time the caller sees this.
    #[error("Refresh token reuse detected")]
    RefreshTokenReused,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Session-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found")]
    SessionNotFound,
}
