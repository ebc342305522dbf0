//! Authentication service module
//!
//! Orchestrates login (credential check, lockout, two-factor gate, session
//! and family creation), logout, refresh and the session management calls
//! exposed to the rest of the system.

mod config;
mod credentials;
mod lockout;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use credentials::{BcryptVerifier, PasswordVerifier, TotpVerifier};
pub use lockout::LockoutTracker;
pub use service::{AuthService, Credentials, LoginOutcome, LoginSession};
