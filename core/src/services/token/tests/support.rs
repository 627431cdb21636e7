//! Shared fixtures for token service tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::StoreError;
use crate::repositories::{InMemoryTokenRepository, TokenRepository};
use crate::services::token::TokenServiceConfig;

pub fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: "test-secret-key-for-token-service".to_string(),
        ..TokenServiceConfig::default()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// In-memory store whose individual calls can be made to fail or hang
#[derive(Default)]
pub struct FlakyRepository {
    pub inner: InMemoryTokenRepository,
    pub fail_save: AtomicBool,
    pub fail_find: AtomicBool,
    pub fail_revoke: AtomicBool,
    pub fail_rotate: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Every call sleeps for an hour before answering
    pub stall: AtomicBool,
    pub delete_calls: AtomicUsize,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn gate(&self, flag: &AtomicBool, operation: &str) -> Result<(), StoreError> {
        if self.stall.load(Ordering::SeqCst) {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        }
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(format!("{operation}: connection refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for FlakyRepository {
    async fn save_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        self.gate(&self.fail_save, "save").await?;
        self.inner.save_refresh_token(record).await
    }

    async fn find_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        self.gate(&self.fail_find, "find").await?;
        self.inner.find_refresh_token(token).await
    }

    async fn revoke_token(&self, token: &str) -> Result<(), StoreError> {
        self.gate(&self.fail_revoke, "revoke").await?;
        self.inner.revoke_token(token).await
    }

    async fn rotate_refresh_token(
        &self,
        old_token: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<(), StoreError> {
        self.gate(&self.fail_rotate, "rotate").await?;
        self.inner.rotate_refresh_token(old_token, replacement).await
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.gate(&self.fail_delete, "delete").await?;
        self.inner.delete_expired_tokens(now).await
    }
}
