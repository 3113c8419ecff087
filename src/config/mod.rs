//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `SHOPFRONT`
//! prefix and nested sections use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use shopfront::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod invitation;
mod redis;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use invitation::InvitationConfig;
pub use redis::RedisConfig;

use serde::Deserialize;

/// Root application configuration.
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (single-use token cache, task queue)
    pub redis: RedisConfig,

    /// Invitation token configuration (signing key, lifetime)
    pub invitation: InvitationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file if present (development), then reads
    /// environment variables with the `SHOPFRONT` prefix, using `__`
    /// to separate nested values:
    ///
    /// - `SHOPFRONT__DATABASE__URL=...` -> `database.url`
    /// - `SHOPFRONT__INVITATION__TOKEN_SECRET=...` -> `invitation.token_secret`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SHOPFRONT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.redis.validate()?;
        self.invitation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize these tests.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("SHOPFRONT__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("SHOPFRONT__REDIS__URL", "redis://localhost:6379");
        env::set_var(
            "SHOPFRONT__INVITATION__TOKEN_SECRET",
            "0123456789abcdef0123456789abcdef",
        );
    }

    fn clear_env() {
        env::remove_var("SHOPFRONT__DATABASE__URL");
        env::remove_var("SHOPFRONT__REDIS__URL");
        env::remove_var("SHOPFRONT__INVITATION__TOKEN_SECRET");
        env::remove_var("SHOPFRONT__INVITATION__TOKEN_TTL_SECS");
    }

    #[test]
    fn loads_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
    }

    #[test]
    fn validates_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invitation_ttl_defaults_to_25_minutes() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.invitation.token_ttl_secs, 1500);
    }

    #[test]
    fn custom_invitation_ttl_overrides_default() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SHOPFRONT__INVITATION__TOKEN_TTL_SECS", "600");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.invitation.token_ttl_secs, 600);
    }
}
