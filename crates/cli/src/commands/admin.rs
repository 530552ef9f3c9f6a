//! Admin account management.
//!
//! Admin rights are never granted over HTTP; these commands are the only way
//! to create or promote an admin.

use sqlx::PgPool;
use thiserror::Error;

use shopeasy_core::{Email, EmailError};
use shopeasy_storefront::db::RepositoryError;
use shopeasy_storefront::db::users::UserRepository;
use shopeasy_storefront::services::auth::{AuthError, AuthService};

/// Environment variable holding the password for `admin create`.
pub const ADMIN_PASSWORD_ENV: &str = "SHOPEASY_ADMIN_PASSWORD";

/// Errors from admin management commands.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{ADMIN_PASSWORD_ENV} must be set to the new admin's password")]
    MissingPassword,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("no user registered with email {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Register a new account and grant it admin rights.
///
/// # Errors
///
/// Returns `AdminError::MissingPassword` if the password variable is unset,
/// or the registration error (duplicate email, weak password, ...).
pub async fn create(pool: &PgPool, email: &str, username: &str) -> Result<(), AdminError> {
    let password = std::env::var(ADMIN_PASSWORD_ENV).map_err(|_| AdminError::MissingPassword)?;

    let user = AuthService::new(pool)
        .register(email, username, &password)
        .await?;
    let admin = UserRepository::new(pool).set_admin(&user.email, true).await?;

    tracing::info!(id = %admin.id, email = %admin.email, "Created admin user");
    Ok(())
}

/// Grant admin rights to an existing account.
///
/// Takes effect at that user's next login.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if nobody has registered the email.
pub async fn promote(pool: &PgPool, email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;

    let user = UserRepository::new(pool)
        .set_admin(&email, true)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UserNotFound(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(id = %user.id, email = %user.email, "Promoted user to admin");
    Ok(())
}
