//! Session persistence.

mod memory;
mod r#trait;

pub use memory::InMemorySessionRepository;
pub use r#trait::SessionRepository;
