//! `RetroFun` orders server.
//!
//! Wires the pieces together at start-up:
//!
//! 1. open the `PostgreSQL` pool from [`Config`]
//! 2. apply the embedded schema (unless disabled)
//! 3. serve the HTTP router until Ctrl+C or SIGTERM
//! 4. drain in-flight requests (bounded by `SHUTDOWN_TIMEOUT`), then close the pool
//!
//! The pool is created here and injected into the repository; nothing else
//! holds a database handle.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;

pub use config::{Config, ConfigError, ServerConfig};

use anyhow::Context as _;
use retrofun_postgres::{PostgresOrderRepository, connect, migrate};
use retrofun_web::{AppState, build_router};
use std::future::IntoFuture;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Run the server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the pool cannot be opened, the schema cannot be
/// applied, the address cannot be bound, or the server fails while running.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let pool = connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;

    if config.run_migrations {
        migrate(&pool).await.context("failed to apply schema")?;
    } else {
        tracing::info!("Skipping schema migrations");
    }

    let app = build_router(AppState::new(PostgresOrderRepository::new(pool.clone())));

    let address = config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, "Listening");

    let (signalled, drain_started) = oneshot::channel();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutting down gracefully...");
        let _ = signalled.send(());
    })
    .into_future();

    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let deadline = async move {
        if drain_started.await.is_ok() {
            tokio::time::sleep(drain_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => result.context("server error")?,
        () = deadline => {
            tracing::warn!(
                timeout_secs = drain_timeout.as_secs(),
                "In-flight requests did not finish in time"
            );
        }
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
