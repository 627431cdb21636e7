//! Token repository trait defining the contract for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::StoreError;

/// Repository trait for refresh token records
///
/// Implementations perform raw persistence only. Expiry and revocation rules
/// belong to the token service; a store never refuses a lookup because a
/// record is expired or revoked.
///
/// Every driver failure must be classified into [`StoreError`] before it
/// leaves the implementation.
///
/// # Concurrency
/// [`revoke_token`](TokenRepository::revoke_token) and
/// [`rotate_refresh_token`](TokenRepository::rotate_refresh_token) must be
/// atomic and exclusive: for a given token exactly one caller observes a
/// successful revoke.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a refresh token record
    ///
    /// Saving a record whose `token` already exists is a no-op success, so
    /// retried inserts are harmless.
    async fn save_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError>;

    /// Find a record by its token string
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - Record found, whatever its state
    /// * `Err(StoreError::NotFound)` - No record for this token
    /// * `Err(StoreError::Unavailable)` - Backend failure
    async fn find_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError>;

    /// Revoke exactly one currently-unrevoked record
    ///
    /// # Returns
    /// * `Ok(())` - This call flipped `revoked` from false to true
    /// * `Err(StoreError::NotFound)` - No row affected: unknown or already revoked
    /// * `Err(StoreError::Unavailable)` - Backend failure
    async fn revoke_token(&self, token: &str) -> Result<(), StoreError>;

    /// Revoke `old_token` and insert `replacement` as one unit
    ///
    /// The conditional revoke runs first, so of two callers rotating the same
    /// token only one gets past it. Stores that support transactions should
    /// override this so that a failed insert also rolls the revoke back.
    ///
    /// # Returns
    /// * `Ok(())` - Old token revoked and replacement stored
    /// * `Err(StoreError::NotFound)` - Old token unknown or already revoked
    /// * `Err(StoreError::Unavailable)` - Backend failure
    async fn rotate_refresh_token(
        &self,
        old_token: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<(), StoreError> {
        self.revoke_token(old_token).await?;
        self.save_refresh_token(replacement).await
    }

    /// Delete every record with `expires_at < now`, revoked or not
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of deleted records, zero when nothing matched
    /// * `Err(StoreError::Unavailable)` - Backend failure
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
