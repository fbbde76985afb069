//! # Database Persistence Layer
//!
//! Postgres persistence for vault state via SQLx.
//!
//! ## Architecture
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the API
//! persists cases, evidence items, custody entries, and audit events to
//! PostgreSQL and hydrates the in-memory stores from it at startup. When
//! absent, the API operates in in-memory-only mode (suitable for
//! development and testing).
//!
//! The stores remain the source of truth while the process runs; this
//! layer is write-through. Custody writes re-check the item's status in a
//! row-locked transaction so a database that diverged from memory is
//! detected instead of overwritten.
//!
//! ## What is persisted
//!
//! - Case records with sensitivity classifications and assignments
//! - Evidence items and their chain-of-custody ledgers
//! - Audit event log (immutable hash chain)

pub mod audit;
pub mod cases;
pub mod evidence;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    // Run embedded migrations.
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
