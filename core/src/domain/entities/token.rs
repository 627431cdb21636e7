//! Token entities for JWT-based authentication.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which half of a credential pair a signed token represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, self-contained credential
    Access,
    /// Long-lived credential backed by a persisted record
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (opaque user identifier)
    pub sub: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Access or refresh
    pub kind: TokenKind,
}

impl Claims {
    /// Creates claims for a token issued at `issued_at` and expiring at `expires_at`
    pub fn new(
        subject: impl Into<String>,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            sub: subject.into(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: issuer.into(),
            aud: audience.into(),
            kind,
        }
    }

    /// Checks whether the claims have expired at `now`
    ///
    /// A token is still valid during the second named by `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Issue time as a timestamp
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Refresh token record stored in the database
///
/// `token` is the signed refresh token itself and serves as the lookup key.
/// `revoked` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Subject this token belongs to
    pub subject: String,

    /// Signed refresh token string
    pub token: String,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub revoked: bool,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Creates a new, unrevoked record
    pub fn new(
        subject: impl Into<String>,
        token: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            token: token.into(),
            expires_at,
            revoked: false,
            created_at,
        }
    }

    /// Checks whether the record can no longer fund a rotation at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Marks the record revoked
    pub fn revoke(&mut self) {
        self.revoked = true;
    }
}

/// Token pair returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Access token expiry instant
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_expiry_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let claims = Claims::new(
            "u1",
            TokenKind::Access,
            now,
            now + Duration::hours(1),
            "iss",
            "aud",
        );

        assert!(!claims.is_expired_at(now));
        assert!(!claims.is_expired_at(now + Duration::hours(1)));
        assert!(claims.is_expired_at(now + Duration::hours(1) + Duration::seconds(1)));
        assert_eq!(claims.expires_at(), now + Duration::hours(1));
        assert_eq!(claims.issued_at(), now);
    }

    #[test]
    fn test_claims_have_unique_ids() {
        let now = Utc::now();
        let a = Claims::new("u1", TokenKind::Refresh, now, now, "iss", "aud");
        let b = Claims::new("u1", TokenKind::Refresh, now, now, "iss", "aud");
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_token_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
        assert_eq!(TokenKind::Access.to_string(), "access");
    }

    #[test]
    fn test_record_expiry_is_inclusive() {
        let now = Utc::now();
        let mut record = RefreshTokenRecord::new("u1", "token", now, now + Duration::days(7));

        assert!(!record.is_expired_at(now));
        assert!(record.is_expired_at(now + Duration::days(7)));
        assert!(!record.revoked);

        record.revoke();
        assert!(record.revoked);
    }
}
