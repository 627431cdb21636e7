//! Configuration for the token service

use chrono::Duration;
use sp_shared::config::AuthConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret (HS256)
    pub jwt_secret: String,
    /// JWT issuer claim
    pub issuer: String,
    /// JWT audience claim
    pub audience: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Upper bound for a single store call
    pub store_timeout: std::time::Duration,
    /// Expiry sweeper settings
    pub sweeper: ExpirySweeperConfig,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: sp_shared::config::DEVELOPMENT_SECRET.to_string(),
            issuer: "streaming-platform".to_string(),
            audience: "streaming-platform-api".to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            store_timeout: std::time::Duration::from_secs(5),
            sweeper: ExpirySweeperConfig::default(),
        }
    }
}

impl From<&AuthConfig> for TokenServiceConfig {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            jwt_secret: auth.jwt.secret.clone(),
            issuer: auth.jwt.issuer.clone(),
            audience: auth.jwt.audience.clone(),
            access_token_ttl: Duration::seconds(auth.access_token_expiry_seconds()),
            refresh_token_ttl: Duration::seconds(auth.refresh_token_expiry_seconds()),
            store_timeout: std::time::Duration::from_millis(auth.store_timeout_ms),
            sweeper: ExpirySweeperConfig {
                interval: std::time::Duration::from_secs(auth.sweeper.interval_seconds),
                enabled: auth.sweeper.enabled,
            },
        }
    }
}

/// Configuration for the expiry sweeper
#[derive(Debug, Clone)]
pub struct ExpirySweeperConfig {
    /// Time between sweeps; the first sweep runs one interval after start
    pub interval: std::time::Duration,
    /// Whether to spawn the sweeper at all
    pub enabled: bool,
}

impl Default for ExpirySweeperConfig {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(24 * 60 * 60),
            enabled: true,
        }
    }
}
