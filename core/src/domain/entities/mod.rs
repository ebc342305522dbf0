//! Domain entities for the token and session lifecycle.

pub mod session;
pub mod token;
pub mod user;

pub use session::Session;
pub use token::{Claims, RefreshToken, RevocationEntry, RevocationReason, TokenPair};
pub use user::{User, UserRole};
