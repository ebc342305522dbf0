//! Repository interfaces and their in-memory implementations.
//!
//! The traits define the persistence contract for the token and session
//! stores; the in-memory implementations back the test suite and document
//! the transactional expectations a durable implementation must meet.

pub mod revocation;
pub mod session;
pub mod token;
pub mod user;

pub use revocation::{InMemoryRevocationRepository, RevocationRepository};
pub use session::{InMemorySessionRepository, SessionRepository};
pub use token::{InMemoryTokenRepository, TokenRepository};
pub use user::{InMemoryUserRepository, UserRepository};
