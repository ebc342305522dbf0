//! User account lookups consumed by login and refresh.

mod memory;
mod r#trait;

pub use memory::InMemoryUserRepository;
pub use r#trait::UserRepository;
