//! Refresh token persistence.

mod memory;
mod r#trait;

pub use memory::InMemoryTokenRepository;
pub use r#trait::TokenRepository;
