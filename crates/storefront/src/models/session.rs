//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use shopeasy_core::{Email, UserId};

use super::User;

/// Session-stored user identity.
///
/// A snapshot taken at login. Admin rights are read from here, so a promotion
/// takes effect on the user's next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's display name.
    pub username: String,
    /// Whether the user may access admin endpoints.
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";
}
