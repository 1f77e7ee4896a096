//! Shared configuration types for Streamus services
//!
//! This crate provides the configuration types common to every Streamus
//! binary, so the API server and its tooling read the same environment
//! variables the same way.

mod database;
mod error;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ConfigResult};

use std::env;

/// Filter used when neither RUST_LOG nor LOG_LEVEL is set
pub const DEFAULT_LOG_LEVEL: &str = "streamus_api=debug,tower_http=debug,info";

/// Common configuration shared between all services
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Environment mode (development, staging, production)
    pub environment: Environment,

    /// Tracing filter directives (from RUST_LOG or LOG_LEVEL)
    pub log_level: String,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse()
                .unwrap_or_default(),
            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("LOG_LEVEL"))
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "stage".parse::<Environment>().unwrap(),
            Environment::Staging
        );
        assert_eq!(
            "anything".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(format!("{}", Environment::Production), "production");
        assert_eq!(format!("{}", Environment::Development), "development");
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        temp_env::with_var_unset("STREAMUS_TEST_PARSE_UNSET", || {
            let value: u32 = parse_env("STREAMUS_TEST_PARSE_UNSET", 42).unwrap();
            assert_eq!(value, 42);
        });
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        temp_env::with_var("STREAMUS_TEST_PARSE_BAD", Some("not-a-number"), || {
            let result: ConfigResult<u32> = parse_env("STREAMUS_TEST_PARSE_BAD", 1);
            assert!(matches!(
                result,
                Err(ConfigError::InvalidValue(name, _)) if name == "STREAMUS_TEST_PARSE_BAD"
            ));
        });
    }

    #[test]
    fn test_common_config_reads_environment() {
        temp_env::with_vars(
            vec![
                ("ENVIRONMENT", Some("prod")),
                ("RUST_LOG", Some("warn")),
            ],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert!(config.environment.is_production());
                assert_eq!(config.log_level, "warn");
            },
        );
    }

    #[test]
    fn test_log_level_falls_back_to_default() {
        temp_env::with_vars(
            vec![("RUST_LOG", None::<&str>), ("LOG_LEVEL", None)],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
            },
        );
    }

    #[test]
    fn test_log_level_from_log_level_var() {
        temp_env::with_vars(
            vec![("RUST_LOG", None), ("LOG_LEVEL", Some("debug"))],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert_eq!(config.log_level, "debug");
            },
        );
    }
}
