//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod logging;
pub mod realtime;
pub mod sweeper;
pub mod tasks;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::sweeper::SweeperConfig;
pub use self::tasks::{BackoffConfig, BackoffStrategy, TaskConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Task lifecycle settings.
    #[serde(default)]
    pub tasks: TaskConfig,
    /// Periodic reconciliation settings.
    #[serde(default)]
    pub sweeper: SweeperConfig,
    /// Event fan-out settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml`, the environment-specific overlay
    /// `config/{env}.toml` and environment variables prefixed with
    /// `WARMUP__` (e.g. `WARMUP__DATABASE__URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration with an explicit base file (extension optional).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WARMUP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.provider == DatabaseProvider::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.provider = \"postgres\"",
            ));
        }
        if self.tasks.default_max_retries > self.tasks.max_retries_limit {
            return Err(AppError::configuration(format!(
                "tasks.default_max_retries ({}) exceeds tasks.max_retries_limit ({})",
                self.tasks.default_max_retries, self.tasks.max_retries_limit
            )));
        }
        if self.tasks.dispatch_limit_max == 0 {
            return Err(AppError::configuration(
                "tasks.dispatch_limit_max must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid_for_memory_provider() {
        let config = AppConfig::default();
        assert_eq!(config.database.provider, DatabaseProvider::Memory);
        assert!(config.validate().is_ok());
        assert_eq!(config.tasks.default_max_retries, 3);
        assert_eq!(config.tasks.backoff.base_delay_seconds, 300);
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Postgres;
        assert!(config.validate().is_err());
        config.database.url = "postgres://warmup@localhost/warmup".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_retries_bounded_by_limit() {
        let mut config = AppConfig::default();
        config.tasks.default_max_retries = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let raw = r#"
            [database]
            provider = "postgres"
            url = "postgres://localhost/warmup"

            [tasks.backoff]
            strategy = "exponential"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.database.provider, DatabaseProvider::Postgres);
        assert_eq!(config.tasks.backoff.strategy, BackoffStrategy::Exponential);
        assert_eq!(config.tasks.backoff.max_delay_seconds, 3600);
        assert_eq!(config.server.port, 8080);
    }
}
