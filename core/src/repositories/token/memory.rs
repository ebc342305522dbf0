//! In-memory implementation of TokenRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// In-memory token repository keyed by token hash.
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.family_id == family_id)
            .cloned()
            .collect())
    }

    async fn revoke_token(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
        replaced_by: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked => {
                token.revoke(revoked_at, replaced_by);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_family(
        &self,
        family_id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.family_id == family_id && !token.is_revoked {
                token.revoke(revoked_at, None);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        except_family: Option<Uuid>,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id
                && Some(token.family_id) != except_family
                && !token.is_revoked
            {
                token.revoke(revoked_at, None);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| !token.is_expired(now));

        Ok(initial_count - tokens.len())
    }
}
