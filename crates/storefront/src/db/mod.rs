//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Shopper and admin accounts
//! - `products` - Catalog, including live stock and the aggregate rating
//! - `orders` / `order_items` - Immutable order records with shipping snapshot
//! - `reviews` - One review per (user, product)
//! - `wishlist` - Saved products, one row per (user, product)
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopeasy-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod reviews;
pub mod stats;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// `PostgreSQL` SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Name of the violated constraint, when the error is a unique violation.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = err
        && db_err.is_unique_violation()
    {
        return Some(db_err.constraint().unwrap_or_default().to_owned());
    }
    None
}

/// Whether the error is a foreign key violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    )
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
