//! In-memory implementation of RevocationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::RevocationEntry;
use crate::errors::DomainError;

use super::r#trait::RevocationRepository;

/// In-memory blacklist keyed by jti.
#[derive(Clone, Default)]
pub struct InMemoryRevocationRepository {
    entries: Arc<RwLock<HashMap<String, RevocationEntry>>>,
}

impl InMemoryRevocationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationRepository for InMemoryRevocationRepository {
    async fn insert(&self, entry: RevocationEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.jti.clone(), entry);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries.contains_key(jti))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().await;
        let initial_count = entries.len();

        entries.retain(|_, entry| !entry.is_expired(now));

        Ok(initial_count - entries.len())
    }
}
