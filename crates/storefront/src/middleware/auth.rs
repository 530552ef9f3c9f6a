//! Authentication extractors and session helpers.
//!
//! API requests without a session user get a JSON 401; page requests are
//! redirected to the home page, where the login modal lives.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use shopeasy_core::Cart;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in administrator.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when an extractor's requirements are not met.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the home page (for HTML requests).
    RedirectToHome,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The user is logged in but is not an admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToHome => Redirect::to("/").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "message": "Login required"})),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({"success": false, "message": "Unauthorized"})),
            )
                .into_response(),
        }
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Whether the request targets the JSON API. Nested routers strip their
/// prefix from `parts.uri`, so the original URI is checked.
fn is_api_request(parts: &Parts) -> bool {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0)
        .path()
        .starts_with("/api/")
}

fn missing_user(parts: &Parts) -> AuthRejection {
    if is_api_request(parts) {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectToHome
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| missing_user(parts))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts).await.ok_or_else(|| missing_user(parts))?;

        if !user.is_admin {
            if is_api_request(parts) {
                return Err(AuthRejection::Forbidden);
            }
            return Err(AuthRejection::RedirectToHome);
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

/// Store the logged-in user in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the user from the session (logout). The cart is kept.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

/// Load the session cart, or an empty cart if none is stored.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Persist the cart to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Remove the cart from the session and write the session back immediately.
///
/// Checkout consumes the cart this way before committing, so a second
/// submission from the same session finds an empty cart instead of placing
/// the same order twice.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn take_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    let cart = session
        .remove::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default();
    session.save().await?;
    Ok(cart)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use shopeasy_core::{Email, UserId};

    use super::*;

    fn user(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            email: Email::parse("shopper@example.com").unwrap(),
            username: "shopper".to_owned(),
            is_admin,
        }
    }

    async fn parts(path: &str, user: Option<CurrentUser>) -> Parts {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        if let Some(user) = user {
            session
                .insert(session_keys::CURRENT_USER, &user)
                .await
                .unwrap();
        }

        let (mut parts, ()) = Request::builder()
            .uri(path)
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(session);
        parts
    }

    #[tokio::test]
    async fn test_guest_api_request_is_unauthorized() {
        let mut parts = parts("/api/orders", None).await;
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::Unauthorized));
    }

    #[tokio::test]
    async fn test_guest_page_request_redirects() {
        let mut parts = parts("/orders", None).await;
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::RedirectToHome));
    }

    #[tokio::test]
    async fn test_shopper_is_forbidden_from_admin_api() {
        let mut parts = parts("/api/admin/users", Some(user(false))).await;
        let rejection = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::Forbidden));
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let mut parts = parts("/api/admin/users", Some(user(true))).await;
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(admin.id, UserId::new(7));
    }

    #[tokio::test]
    async fn test_taken_cart_is_gone_for_the_same_session() {
        let store = Arc::new(MemoryStore::default());
        let session = Session::new(None, store.clone(), None);

        let mut cart = Cart::new();
        cart.add(&shopeasy_core::StockSnapshot {
            id: shopeasy_core::ProductId::new(3),
            name: "Lamp".to_owned(),
            price: rust_decimal::Decimal::new(2_500, 2),
            image: String::new(),
            stock: 2,
        })
        .unwrap();
        save_cart(&session, &cart).await.unwrap();
        session.save().await.unwrap();

        // A concurrent request for the same cookie loads its own Session.
        let other_request = Session::new(session.id(), store.clone(), None);

        assert_eq!(take_cart(&session).await.unwrap(), cart);
        assert!(load_cart(&other_request).await.unwrap().is_empty());
        assert!(take_cart(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_keeps_cart() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_current_user(&session, &user(false)).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&shopeasy_core::StockSnapshot {
            id: shopeasy_core::ProductId::new(1),
            name: "Mug".to_owned(),
            price: rust_decimal::Decimal::new(899, 2),
            image: String::new(),
            stock: 3,
        })
        .unwrap();
        save_cart(&session, &cart).await.unwrap();

        clear_current_user(&session).await.unwrap();

        assert!(
            session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(load_cart(&session).await.unwrap(), cart);
    }
}
