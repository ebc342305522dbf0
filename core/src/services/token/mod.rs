//! Token service module
//!
//! This module handles all token-related operations:
//! - JWT access token issuance and verification
//! - Refresh token rotation with family reuse detection
//! - Revocation blacklist management
//! - Short-TTL verification caching
//! - Background cleanup of expired rows

mod cache;
mod cleanup;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use cache::{VerifyCache, VerifyOutcome};
pub use cleanup::{CleanupConfig, CleanupResult, CleanupService};
pub use config::TokenServiceConfig;
pub use service::TokenService;
