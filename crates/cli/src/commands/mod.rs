//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;

use shopeasy_storefront::config::database_url_from_env;
use shopeasy_storefront::db;

/// Load `.env`, then connect using the storefront's database URL variables.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
