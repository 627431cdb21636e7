//! Authentication and token lifecycle configuration

use serde::{Deserialize, Serialize};

/// Secret shipped for local development only; refused in production
pub const DEVELOPMENT_SECRET: &str = "development-secret-please-change-in-production";

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_EXPIRY_SECONDS: i64 = 10 * 365 * 86400;

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Symmetric secret used for HS256 signing
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEVELOPMENT_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("streaming-platform"),
            audience: String::from("streaming-platform-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Check if using the development secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEVELOPMENT_SECRET
    }
}

/// Background expiry sweeper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    /// How often to delete expired refresh tokens (in seconds)
    #[serde(default = "default_sweep_interval")]
    pub interval_seconds: u64,

    /// Whether the sweeper runs at all
    #[serde(default = "default_sweeper_enabled")]
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_sweep_interval(),
            enabled: default_sweeper_enabled(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Expiry sweeper configuration
    #[serde(default)]
    pub sweeper: SweeperConfig,

    /// Upper bound for a single refresh token store call in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            sweeper: SweeperConfig::default(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl AuthConfig {
    /// Get access token expiry in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.jwt.access_token_expiry
    }

    /// Get refresh token expiry in seconds
    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.jwt.refresh_token_expiry
    }
}

fn default_sweep_interval() -> u64 {
    86400 // 24 hours
}

fn default_sweeper_enabled() -> bool {
    true
}

fn default_store_timeout_ms() -> u64 {
    5000
}
