//! Session service test suite and fixtures.


use std::sync::Arc;

use uuid::Uuid;

use crate::domain::clock::FixedClock;
use crate::repositories::InMemorySessionRepository;
use crate::services::context::ClientContext;
use crate::services::session::SessionService;

use ks_shared::config::SessionPolicyConfig;

pub(crate) struct Harness {
    pub sessions: Arc<InMemorySessionRepository>,
    pub clock: Arc<FixedClock>,
    pub service: SessionService<InMemorySessionRepository>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_max_sessions(3)
    }

    pub fn with_max_sessions(max: usize) -> Self {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let clock = Arc::new(FixedClock::at_now());
        let config = SessionPolicyConfig {
            timeout: 86_400,
            max_concurrent_sessions: max,
        };
        let service = SessionService::new(Arc::clone(&sessions), config, clock.clone());

        Self {
            sessions,
            clock,
            service,
        }
    }
}

pub(crate) fn ctx_from(ip: &str) -> ClientContext {
    ClientContext::new(ip, "keystone-tests/1.0")
}

pub(crate) fn user() -> Uuid {
    Uuid::new_v4()
}
