//! Configuration knobs, resolved once from the process environment.

use std::env;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Environment variable names read by [`StoreConfig::from_env`].
pub mod env_keys {
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const MAX_CONNECTIONS: &str = "DOCSTORE_MAX_CONNECTIONS";
    pub const BOOTSTRAP_SCHEMA: &str = "DOCSTORE_BOOTSTRAP_SCHEMA";
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    MissingVar(&'static str),
    #[error("invalid value for `{key}`: `{value}`")]
    InvalidVar { key: &'static str, value: String },
}

/// Connection settings for the Postgres-backed client. Built explicitly
/// or resolved from the environment; the crate never reads globals past
/// construction.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Create the `document_t` table on connect when missing.
    pub bootstrap_schema: bool,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bootstrap_schema: true,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_bootstrap_schema(mut self, bootstrap_schema: bool) -> Self {
        self.bootstrap_schema = bootstrap_schema;
        self
    }

    /// Resolves the configuration from `.env` and the process
    /// environment. `DATABASE_URL` is required, the rest default.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let database_url = env::var(env_keys::DATABASE_URL)
            .map_err(|_| ConfigError::MissingVar(env_keys::DATABASE_URL))?;

        let mut config = Self::new(database_url);

        if let Ok(value) = env::var(env_keys::MAX_CONNECTIONS) {
            config.max_connections = value.parse().map_err(|_| ConfigError::InvalidVar {
                key: env_keys::MAX_CONNECTIONS,
                value,
            })?;
        }

        if let Ok(value) = env::var(env_keys::BOOTSTRAP_SCHEMA) {
            config.bootstrap_schema = value.parse().map_err(|_| ConfigError::InvalidVar {
                key: env_keys::BOOTSTRAP_SCHEMA,
                value,
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = StoreConfig::new("postgres://localhost/docs");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(config.bootstrap_schema);

        let config = config.with_max_connections(12).with_bootstrap_schema(false);
        assert_eq!(config.max_connections, 12);
        assert!(!config.bootstrap_schema);
    }
}
