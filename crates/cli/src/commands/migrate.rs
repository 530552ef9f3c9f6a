//! Database migration command.
//!
//! Applies `crates/storefront/migrations/`, embedded at compile time. The
//! server never migrates on startup.

use sqlx::PgPool;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(pool).await?;
    tracing::info!("Migrations complete!");
    Ok(())
}
