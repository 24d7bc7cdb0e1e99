//! Relational schema for the catalog and orders.
//!
//! The DDL lives in `postgres/migrations` and is embedded at compile time.
//! Every statement is idempotent (`IF NOT EXISTS`), so applying the schema to
//! a database created by other tooling is harmless.
//!
//! Tables read by the order listing:
//!
//! ```text
//! customers ──< orders ──< orders_items >── products >── manufacturers
//!                                              │
//!                                              └──< product_countries >── countries
//! ```

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply all pending schema migrations.
///
/// # Errors
///
/// Returns [`MigrateError`] if a migration fails or the migration history
/// does not match the embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    tracing::info!(migrations = MIGRATOR.iter().count(), "Applying database schema");
    MIGRATOR.run(pool).await?;
    tracing::info!("Database schema up to date");
    Ok(())
}
