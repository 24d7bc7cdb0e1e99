//! `PostgreSQL` storage for `RetroFun` orders.
//!
//! This crate implements the [`OrderRepository`](retrofun_core::repository::OrderRepository)
//! seam from `retrofun-core` on top of sqlx:
//!
//! - [`pool`]: connection pool construction with per-connection timeouts
//! - [`schema`]: the embedded catalog and orders schema
//! - [`orders`]: the order listing query builder and repository
//!
//! # Example
//!
//! ```no_run
//! use retrofun_postgres::{PostgresConfig, PostgresOrderRepository, connect, migrate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect(&PostgresConfig::new("postgres://localhost/retrofun")).await?;
//! migrate(&pool).await?;
//! let orders = PostgresOrderRepository::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod orders;
pub mod pool;
pub mod schema;

pub use orders::PostgresOrderRepository;
pub use pool::{PostgresConfig, connect};
pub use schema::{MIGRATOR, migrate};
