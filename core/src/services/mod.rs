//! Business services containing domain logic and use cases.

pub mod auth;
pub mod session;
pub mod token;

mod context;
mod hash;

// Re-export commonly used types
pub use auth::{
    AuthService, AuthServiceConfig, BcryptVerifier, Credentials, LockoutTracker, LoginOutcome,
    LoginSession, PasswordVerifier, TotpVerifier,
};
pub use context::ClientContext;
pub use session::SessionService;
pub use token::{
    CleanupConfig, CleanupResult, CleanupService, TokenService, TokenServiceConfig, VerifyCache,
    VerifyOutcome,
};
