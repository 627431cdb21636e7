//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh tokens are stored verbatim in the `refresh_tokens` table created by
//! `migrations/20240101000000_create_refresh_tokens.sql`; the unique key on
//! `token` makes it the lookup key. Every SQLx error is classified into
//! [`StoreError`] before it leaves this module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sp_core::domain::entities::token::RefreshTokenRecord;
use sp_core::errors::StoreError;
use sp_core::repositories::TokenRepository;

/// Width of the `user_id` column
pub const MAX_SUBJECT_LENGTH: usize = 255;
/// Width of the `token` column
pub const MAX_TOKEN_LENGTH: usize = 2048;

const INSERT_TOKEN: &str = r#"
    INSERT INTO refresh_tokens (id, user_id, token, expires_at, revoked, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
    ON DUPLICATE KEY UPDATE token = token
"#;

const SELECT_TOKEN: &str = r#"
    SELECT id, user_id, token, expires_at, revoked, created_at
    FROM refresh_tokens
    WHERE token = ?
    LIMIT 1
"#;

const REVOKE_TOKEN: &str = r#"
    UPDATE refresh_tokens
    SET revoked = TRUE
    WHERE token = ? AND revoked = FALSE
"#;

const DELETE_EXPIRED: &str = r#"
    DELETE FROM refresh_tokens
    WHERE expires_at < ?
"#;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a RefreshTokenRecord
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("read id", e))?;

        Ok(RefreshTokenRecord {
            id: parse_record_id(&id)?,
            subject: row
                .try_get("user_id")
                .map_err(|e| map_sqlx_error("read user_id", e))?,
            token: row
                .try_get("token")
                .map_err(|e| map_sqlx_error("read token", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| map_sqlx_error("read expires_at", e))?,
            revoked: row
                .try_get("revoked")
                .map_err(|e| map_sqlx_error("read revoked", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| map_sqlx_error("read created_at", e))?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        check_column_widths(&record)?;

        sqlx::query(INSERT_TOKEN)
            .bind(record.id.to_string())
            .bind(&record.subject)
            .bind(&record.token)
            .bind(record.expires_at)
            .bind(record.revoked)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("save refresh token", e))?;

        Ok(())
    }

    async fn find_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        let row = sqlx::query(SELECT_TOKEN)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find refresh token", e))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn revoke_token(&self, token: &str) -> Result<(), StoreError> {
        let result = sqlx::query(REVOKE_TOKEN)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("revoke refresh token", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        old_token: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<(), StoreError> {
        check_column_widths(&replacement)?;

        // Dropping the transaction without commit rolls it back
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin rotation", e))?;

        let revoked = sqlx::query(REVOKE_TOKEN)
            .bind(old_token)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("revoke rotated token", e))?;

        if revoked.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("roll back rotation", e))?;
            return Err(StoreError::NotFound);
        }

        sqlx::query(INSERT_TOKEN)
            .bind(replacement.id.to_string())
            .bind(&replacement.subject)
            .bind(&replacement.token)
            .bind(replacement.expires_at)
            .bind(replacement.revoked)
            .bind(replacement.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert rotated token", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit rotation", e))
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(DELETE_EXPIRED)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete expired tokens", e))?;

        Ok(result.rows_affected())
    }
}

/// Classify a SQLx error into the store error set
///
/// Only `RowNotFound` means "no such record"; every other driver, pool or
/// decoding failure is reported as `Unavailable`.
pub fn map_sqlx_error(operation: &str, error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => {
            tracing::warn!(operation, error = %other, "Refresh token store call failed");
            StoreError::unavailable(format!("{}: {}", operation, other))
        }
    }
}

/// Reject records the schema would truncate or refuse
fn check_column_widths(record: &RefreshTokenRecord) -> Result<(), StoreError> {
    if record.subject.len() > MAX_SUBJECT_LENGTH {
        return Err(StoreError::unavailable(format!(
            "subject is {} bytes, the store holds at most {}",
            record.subject.len(),
            MAX_SUBJECT_LENGTH
        )));
    }
    if record.token.len() > MAX_TOKEN_LENGTH {
        return Err(StoreError::unavailable(format!(
            "refresh token is {} bytes, the store holds at most {}",
            record.token.len(),
            MAX_TOKEN_LENGTH
        )));
    }
    Ok(())
}

fn parse_record_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id)
        .map_err(|e| StoreError::unavailable(format!("invalid record id {:?}: {}", id, e)))
}
