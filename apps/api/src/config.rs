//! API server configuration

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use streamus_shared_config::{parse_env, CommonConfig, ConfigError, DatabaseConfig, Environment};

use crate::controllers::DEFAULT_BATCH_LIMIT;

/// Where playlist data is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// PostgreSQL through the connection pool
    #[default]
    Postgres,
    /// Process memory; contents are lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "in-memory" | "inmemory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue(
                "STORAGE_BACKEND".to_string(),
                format!("unknown backend '{}'", other),
            )),
        }
    }
}

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// Storage backend (default: postgres)
    pub storage_backend: StorageBackend,

    /// Maximum items accepted in one batch create (default: 5000)
    pub batch_limit: usize,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode `DATABASE_URL` must be set explicitly and the
    /// in-memory backend is refused.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
        .unwrap_or_default();

        let storage_backend: StorageBackend = match env::var("STORAGE_BACKEND") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => StorageBackend::default(),
        };

        if environment.is_production() {
            Self::validate_production(storage_backend)?;
        }

        let common = CommonConfig::from_env().context("Failed to load common config")?;

        let batch_limit: usize = parse_env("PLAYLIST_ITEM_BATCH_LIMIT", DEFAULT_BATCH_LIMIT)?;
        if batch_limit == 0 {
            return Err(ConfigError::ValidationError(
                "PLAYLIST_ITEM_BATCH_LIMIT must be greater than zero".to_string(),
            )
            .into());
        }

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            storage_backend,

            batch_limit,

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        })
    }

    fn validate_production(storage_backend: StorageBackend) -> Result<()> {
        if storage_backend == StorageBackend::Memory {
            bail!(
                "STORAGE_BACKEND=memory is not allowed in production. \
                 Playlist data would be lost on restart."
            );
        }

        match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => Ok(()),
            _ => {
                bail!(
                    "DATABASE_URL environment variable is required in production. \
                     Please set your PostgreSQL connection string."
                );
            }
        }
    }

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}
