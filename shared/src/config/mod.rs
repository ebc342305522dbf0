//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT, session policy and lockout configuration
//! - `cache` - Token verification cache tuning

pub mod auth;
pub mod cache;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, LockoutConfig, SessionPolicyConfig};
pub use cache::VerifyCacheConfig;
