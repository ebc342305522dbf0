//! Shared configuration types for the Keystone authentication core
//!
//! This crate provides the configuration structs consumed by the core
//! services: JWT signing parameters, session policy, lockout policy and
//! verification-cache tuning.

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AuthConfig, JwtConfig, LockoutConfig, SessionPolicyConfig, VerifyCacheConfig,
};
