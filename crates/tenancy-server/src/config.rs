//! Server configuration read from the environment.

use tenancy_auth::config::{AuthConfig, RuntimeMode, UnknownRuntimeMode};
use tenancy_db::DbConfig;
use thiserror::Error;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const TENANCY_ENV: &str = "TENANCY_ENV";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please provide DATABASE_URL in .env file")]
    MissingDatabaseUrl,

    #[error("invalid {TENANCY_ENV}: {0}")]
    RuntimeMode(#[from] UnknownRuntimeMode),

    #[error("invalid {DATABASE_MAX_CONNECTIONS} '{value}': expected a positive integer")]
    MaxConnections { value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: RuntimeMode,
    pub database: DbConfig,
}

impl ServerConfig {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let mode = match lookup(TENANCY_ENV) {
            Some(value) => value.parse()?,
            None => RuntimeMode::default(),
        };

        let mut database = DbConfig::new(url);
        if let Some(value) = lookup(DATABASE_MAX_CONNECTIONS) {
            database.max_connections = value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::MaxConnections { value })?;
        }

        Ok(Self { mode, database })
    }

    pub fn auth(&self) -> AuthConfig {
        AuthConfig::for_mode(self.mode)
    }
}
