//! # Keystone Core
//!
//! Token and session lifecycle core for the Keystone backend. This crate
//! contains the domain entities, repository interfaces and services that
//! implement access-token issuance and verification, refresh-token rotation
//! with family reuse detection, the revocation blacklist and session
//! bookkeeping.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    Claims, Clock, FixedClock, RefreshToken, RevocationEntry, RevocationReason, Session,
    SystemClock, TokenPair, User, UserRole,
};
pub use errors::{AuthError, DomainError, DomainResult, SessionError, TokenError};
pub use repositories::{
    InMemoryRevocationRepository, InMemorySessionRepository, InMemoryTokenRepository,
    InMemoryUserRepository, RevocationRepository, SessionRepository, TokenRepository,
    UserRepository,
};
pub use services::{
    AuthService, AuthServiceConfig, BcryptVerifier, CleanupConfig, CleanupResult, CleanupService,
    ClientContext, Credentials, LockoutTracker, LoginOutcome, LoginSession, PasswordVerifier,
    SessionService, TokenService, TokenServiceConfig, TotpVerifier, VerifyCache, VerifyOutcome,
};
