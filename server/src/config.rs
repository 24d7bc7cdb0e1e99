//! Configuration management for the orders server.
//!
//! Loads configuration from environment variables. Only `DATABASE_URL` is
//! required; everything else has a default. A variable that is set but cannot
//! be parsed is an error, never silently replaced by its default.
//!
//! | Variable                     | Default   |
//! |------------------------------|-----------|
//! | `DATABASE_URL`               | required  |
//! | `DATABASE_MAX_CONNECTIONS`   | `10`      |
//! | `DATABASE_MIN_CONNECTIONS`   | `1`       |
//! | `DATABASE_CONNECT_TIMEOUT`   | `30` s    |
//! | `DATABASE_IDLE_TIMEOUT`      | `600` s   |
//! | `DATABASE_STATEMENT_TIMEOUT` | `60` s    |
//! | `DATABASE_RUN_MIGRATIONS`    | `true`    |
//! | `HOST`                       | `0.0.0.0` |
//! | `PORT`                       | `5000`    |
//! | `SHUTDOWN_TIMEOUT`           | `30` s    |

use retrofun_postgres::PostgresConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set to a value of the wrong type
    #[error("invalid value {value:?} for environment variable {name}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// The rejected value
        value: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `PostgreSQL` configuration
    pub database: PostgresConfig,
    /// Apply the embedded schema at start-up
    pub run_migrations: bool,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// `host:port` to bind.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `DATABASE_URL` is missing or any variable
    /// holds an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let defaults = PostgresConfig::new(url);

        Ok(Self {
            database: PostgresConfig {
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
                min_connections: parse_or(&var, "DATABASE_MIN_CONNECTIONS", defaults.min_connections)?,
                connect_timeout: parse_or(&var, "DATABASE_CONNECT_TIMEOUT", defaults.connect_timeout)?,
                idle_timeout: parse_or(&var, "DATABASE_IDLE_TIMEOUT", defaults.idle_timeout)?,
                statement_timeout: parse_or(
                    &var,
                    "DATABASE_STATEMENT_TIMEOUT",
                    defaults.statement_timeout,
                )?,
                ..defaults
            },
            run_migrations: parse_or(&var, "DATABASE_RUN_MIGRATIONS", true)?,
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&var, "PORT", 5000)?,
                shutdown_timeout: parse_or(&var, "SHUTDOWN_TIMEOUT", 30)?,
            },
        })
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
