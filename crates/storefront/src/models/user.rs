//! User domain types.

use chrono::{DateTime, Utc};

use shopeasy_core::{Email, UserId};

/// A registered shopper or admin (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, unique and stored lowercase.
    pub email: Email,
    /// Display name, unique.
    pub username: String,
    /// Whether the user may use the back-office.
    pub is_admin: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A user together with the number of orders they have placed.
#[derive(Debug, Clone)]
pub struct UserWithOrderCount {
    pub user: User,
    pub total_orders: i64,
}
