//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing, lifetimes and the expiry sweeper
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration
//!
//! [`AppConfig::load`] layers the sources in this order, later ones winning:
//! built-in defaults for the detected environment, an optional YAML/TOML/JSON
//! file, a `.env` file, and `SP_`-prefixed environment variables using `__`
//! as the nesting separator (`SP_AUTH__JWT__SECRET`).

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Re-export commonly used types
pub use auth::{
    AuthConfig, JwtConfig, SweeperConfig, DEVELOPMENT_SECRET, MAX_TOKEN_EXPIRY_SECONDS,
};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Prefix for configuration environment variables
pub const ENV_PREFIX: &str = "SP";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Built-in defaults for an environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        dotenvy::dotenv().ok();

        let defaults = Self::for_environment(Environment::from_env());
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&defaults)?);

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigLoadError::Invalid(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: AppConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations the token lifecycle cannot run with
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let jwt = &self.auth.jwt;

        if jwt.secret.trim().is_empty() {
            return Err(ConfigLoadError::Invalid("auth.jwt.secret must not be empty".into()));
        }
        if jwt.access_token_expiry <= 0 || jwt.refresh_token_expiry <= 0 {
            return Err(ConfigLoadError::Invalid("token expiries must be positive".into()));
        }
        if jwt.refresh_token_expiry > MAX_TOKEN_EXPIRY_SECONDS {
            return Err(ConfigLoadError::Invalid(format!(
                "auth.jwt.refresh_token_expiry must not exceed {} seconds",
                MAX_TOKEN_EXPIRY_SECONDS
            )));
        }
        if jwt.access_token_expiry >= jwt.refresh_token_expiry {
            return Err(ConfigLoadError::Invalid(
                "access token expiry must be shorter than refresh token expiry".into(),
            ));
        }
        if self.auth.sweeper.interval_seconds == 0 {
            return Err(ConfigLoadError::Invalid(
                "auth.sweeper.interval_seconds must be positive".into(),
            ));
        }
        if self.environment.is_production() && jwt.is_using_default_secret() {
            return Err(ConfigLoadError::Invalid(
                "the development JWT secret cannot be used in production".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.jwt.access_token_expiry, 900);
        assert_eq!(config.auth.sweeper.interval_seconds, 86400);
    }

    #[test]
    fn test_production_rejects_development_secret() {
        let config = AppConfig::for_environment(Environment::Production);
        assert!(matches!(config.validate(), Err(ConfigLoadError::Invalid(_))));

        let mut config = AppConfig::for_environment(Environment::Production);
        config.auth.jwt = JwtConfig::new("a-real-production-secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_access_ttl_must_be_shorter_than_refresh_ttl() {
        let mut config = AppConfig::default();
        config.auth.jwt.access_token_expiry = config.auth.jwt.refresh_token_expiry;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_refresh_expiry_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt.refresh_token_expiry = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigLoadError::Invalid(_))));

        config.auth.jwt.refresh_token_expiry = MAX_TOKEN_EXPIRY_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt.secret = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_yaml_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!(
            "sp-shared-config-{}.yaml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "auth:\n  jwt:\n    secret: file-secret\n    access_token_expiry: 3600\n  sweeper:\n    interval_seconds: 60\nserver:\n  port: 9090"
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.auth.jwt.secret, "file-secret");
        assert_eq!(config.auth.jwt.access_token_expiry, 3600);
        assert_eq!(config.auth.jwt.refresh_token_expiry, 604800);
        assert_eq!(config.auth.sweeper.interval_seconds, 60);
        assert!(config.auth.sweeper.enabled);
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = Path::new("/definitely/not/here/config.yaml");
        assert!(matches!(
            AppConfig::load(Some(path)),
            Err(ConfigLoadError::Invalid(_))
        ));
    }
}
