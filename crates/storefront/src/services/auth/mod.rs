//! Authentication service.
//!
//! Password registration and login. Passwords are hashed with Argon2id.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use shopeasy_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Allowed username length, in characters.
const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=80;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email, username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidUsername` or `AuthError::WeakPassword` if
    /// the username or password break the length rules.
    /// Returns `AuthError::EmailTaken` or `AuthError::UsernameTaken` on duplicates.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        if email.trim().is_empty() || username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields("All fields are required"));
        }

        let email = Email::parse(email)?;
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        self.users
            .create(&email, username, &password_hash, false)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(field) if field == "username" => {
                    AuthError::UsernameTaken
                }
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields("Email and password required"));
        }

        // A malformed email cannot belong to any account
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if !USERNAME_LENGTH.contains(&username.chars().count()) {
        return Err(AuthError::InvalidUsername(format!(
            "Username must be between {} and {} characters",
            USERNAME_LENGTH.start(),
            USERNAME_LENGTH.end()
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2 and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_length_rule() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_username_length_rule() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"x".repeat(80)).is_ok());
        assert!(validate_username(&"x".repeat(81)).is_err());
    }
}
