//! Access-token revocation blacklist persistence.

mod memory;
mod r#trait;

pub use memory::InMemoryRevocationRepository;
pub use r#trait::RevocationRepository;
