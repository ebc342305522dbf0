//! Session bookkeeping: creation, concurrency ceiling, activity tracking
//! and suspicious-session detection.

mod service;

#[cfg(test)]
mod tests;

pub use service::SessionService;
