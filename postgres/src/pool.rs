//! Connection pool construction.
//!
//! The pool is built once at start-up and handed to the repositories that need
//! it; nothing holds a global database handle.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,
    /// Idle timeout in seconds (connections idle longer than this are closed)
    pub idle_timeout: u64,
    /// Statement timeout in seconds (0 disables it)
    pub statement_timeout: u64,
}

impl PostgresConfig {
    /// Settings for `url` with the default pool sizing and timeouts.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 30,
            idle_timeout: 600,
            statement_timeout: 60,
        }
    }
}

/// Open a connection pool.
///
/// Every pooled connection runs with the configured `statement_timeout`, so
/// no listing query can block a request indefinitely.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the URL is invalid or the initial connections
/// cannot be established.
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, sqlx::Error> {
    let statement_timeout_ms = config.statement_timeout.saturating_mul(1000);
    let options = config
        .url
        .parse::<PgConnectOptions>()?
        .options([("statement_timeout", statement_timeout_ms)]);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout)))
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = PostgresConfig::new("postgres://localhost/retrofun");
        assert_eq!(config.url, "postgres://localhost/retrofun");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.statement_timeout, 60);
    }
}
