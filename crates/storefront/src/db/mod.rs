//! Database access for the storefront `PostgreSQL` instance.
//!
//! The database holds local state only (the catalog is the source of truth
//! for products and stock):
//!
//! ## Tables
//!
//! - `cart_snapshots` - Write-through snapshot of the shopping cart, one
//!   row per slot
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run at startup
//! via [`run_migrations`].

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
