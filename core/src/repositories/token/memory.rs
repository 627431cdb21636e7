//! In-memory implementation of TokenRepository
//!
//! Used by tests and single-process development setups. All mutations take
//! the write lock, which makes revoke and rotate exclusive per token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::StoreError;

use super::r#trait::TokenRepository;

/// In-memory token repository keyed by token string
#[derive(Clone)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl InMemoryTokenRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether no records are stored
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// All records for a subject, in no particular order
    pub async fn records_for_subject(&self, subject: &str) -> Vec<RefreshTokenRecord> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|record| record.subject == subject)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;
        tokens.entry(record.token.clone()).or_insert(record);
        Ok(())
    }

    async fn find_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        let tokens = self.tokens.read().await;
        tokens.get(token).cloned().ok_or(StoreError::NotFound)
    }

    async fn revoke_token(&self, token: &str) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token) {
            Some(record) if !record.revoked => {
                record.revoke();
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn rotate_refresh_token(
        &self,
        old_token: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(old_token) {
            Some(record) if !record.revoked => record.revoke(),
            _ => return Err(StoreError::NotFound),
        }
        tokens.entry(replacement.token.clone()).or_insert(replacement);
        Ok(())
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, record| record.expires_at >= now);

        Ok((initial_count - tokens.len()) as u64)
    }
}
