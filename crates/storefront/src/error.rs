//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Every error response is JSON of the form
//! `{"success": false, "message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use shopeasy_core::{CartError, ShippingError};

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::catalog::CatalogError;
use crate::services::checkout::CheckoutError;
use crate::services::reviews::ReviewError;
use crate::services::wishlist::WishlistError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart mutation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Review operation failed.
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// Wishlist operation failed.
    #[error("Wishlist error: {0}")]
    Wishlist(#[from] WishlistError),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ShippingError> for AppError {
    fn from(err: ShippingError) -> Self {
        Self::Checkout(CheckoutError::Shipping(err))
    }
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::MissingFields(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidUsername(_)
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::EmailTaken | AuthError::UsernameTaken => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart | CheckoutError::Shipping(_) => StatusCode::BAD_REQUEST,
                CheckoutError::InsufficientStock { .. } | CheckoutError::ProductUnavailable(_) => {
                    StatusCode::CONFLICT
                }
                CheckoutError::OrderNumberExhausted | CheckoutError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Catalog(err) => match err {
                CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
                CatalogError::NotFound => StatusCode::NOT_FOUND,
                CatalogError::HasOrderHistory => StatusCode::CONFLICT,
                CatalogError::Repository(err) => repository_status(err),
            },
            Self::Review(err) => match err {
                ReviewError::MissingFields
                | ReviewError::InvalidRating
                | ReviewError::CommentTooLong => StatusCode::BAD_REQUEST,
                ReviewError::ProductNotFound => StatusCode::NOT_FOUND,
                ReviewError::AlreadyReviewed => StatusCode::CONFLICT,
                ReviewError::Repository(err) => repository_status(err),
            },
            Self::Wishlist(err) => match err {
                WishlistError::ProductNotFound => StatusCode::NOT_FOUND,
                WishlistError::Repository(err) => repository_status(err),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client. Server errors are never detailed.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return INTERNAL_MESSAGE.to_owned();
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
                AuthError::EmailTaken => "Email already registered".to_owned(),
                AuthError::UsernameTaken => "Username already taken".to_owned(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                other => other.to_string(),
            },
            Self::Database(RepositoryError::NotFound)
            | Self::Catalog(CatalogError::NotFound | CatalogError::Repository(RepositoryError::NotFound)) => {
                "Not found".to_owned()
            }
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Cart(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::Catalog(CatalogError::HasOrderHistory) => {
                "Cannot delete a product that has order history".to_owned()
            }
            Self::Catalog(err) => err.to_string(),
            Self::Review(ReviewError::ProductNotFound)
            | Self::Wishlist(WishlistError::ProductNotFound) => "Product not found".to_owned(),
            Self::Review(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::RateLimited => "Too many requests".to_owned(),
            _ => self.to_string(),
        }
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = json!({
            "success": false,
            "message": self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stock_errors_differ_between_cart_and_checkout() {
        let cart = AppError::from(CartError::InsufficientStock {
            name: "Lamp".to_owned(),
            available: 1,
        });
        assert_eq!(cart.status(), StatusCode::BAD_REQUEST);

        let checkout = AppError::from(CheckoutError::InsufficientStock {
            name: "Lamp".to_owned(),
        });
        assert_eq!(checkout.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_domain_error_statuses() {
        assert_eq!(
            AppError::from(CheckoutError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ShippingError::Missing("shipping_zip")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::EmailTaken).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(ReviewError::AlreadyReviewed).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(CatalogError::HasOrderHistory).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(CatalogError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_body_is_json_failure() {
        let body = body_json(AppError::from(ShippingError::Missing("shipping_city"))).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "shipping_city is required");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let body = body_json(AppError::Database(RepositoryError::DataCorruption(
            "bad row 42".to_owned(),
        )))
        .await;
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_auth_messages() {
        let body = body_json(AppError::from(AuthError::InvalidCredentials)).await;
        assert_eq!(body["message"], "Invalid email or password");

        let body = body_json(AppError::from(AuthError::UsernameTaken)).await;
        assert_eq!(body["message"], "Username already taken");
    }
}
