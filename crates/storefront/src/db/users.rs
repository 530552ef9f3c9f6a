//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopeasy_core::{Email, UserId};

use super::{RepositoryError, unique_violation};
use crate::models::{User, UserWithOrderCount};

const USER_COLUMNS: &str = "id, email, username, is_admin, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    username: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            email,
            username: r.username,
            is_admin: r.is_admin,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct OrderCountRow {
    #[sqlx(flatten)]
    user: UserRow,
    total_orders: i64,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user with a pre-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming the duplicated field
    /// (`"email"` or `"username"`) if either is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (email, username, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(username)
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match unique_violation(&e).as_deref() {
            Some("users_username_key") => RepositoryError::Conflict("username".to_owned()),
            Some(_) => RepositoryError::Conflict("email".to_owned()),
            None => RepositoryError::Database(e),
        })?;

        User::try_from(row)
    }

    /// Whether a username is already taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<CredentialsRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Grant or revoke admin rights.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    pub async fn set_admin(&self, email: &Email, is_admin: bool) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET is_admin = $2 WHERE email = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(is_admin)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// All users with their order counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_order_counts(&self) -> Result<Vec<UserWithOrderCount>, RepositoryError> {
        let rows: Vec<OrderCountRow> = sqlx::query_as(
            r"
            SELECT u.id, u.email, u.username, u.is_admin, u.created_at,
                   COUNT(o.id) AS total_orders
            FROM users u
            LEFT JOIN orders o ON o.user_id = u.id
            GROUP BY u.id
            ORDER BY u.created_at DESC, u.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| -> Result<_, RepositoryError> {
                Ok(UserWithOrderCount {
                    user: User::try_from(r.user)?,
                    total_orders: r.total_orders,
                })
            })
            .collect()
    }
}
