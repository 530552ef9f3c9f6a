//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was absent or blank.
    #[error("{0}")]
    MissingFields(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shopeasy_core::EmailError),

    /// Username fails the length rules.
    #[error("{0}")]
    InvalidUsername(String),

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Another account already uses this email.
    #[error("email already registered")]
    EmailTaken,

    /// Another account already uses this username.
    #[error("username already taken")]
    UsernameTaken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
