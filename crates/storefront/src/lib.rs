//! ShopEasy storefront library.
//!
//! The web service as a library, so the binary, the CLI and the tests share
//! one router, one schema and one set of repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the application router with every layer except Sentry's.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tokio::sync::mpsc;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::services::notifications::NotificationQueue;

    /// Router over a pool that never connects; only routes that stay off
    /// the database can be exercised.
    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/shopeasy_unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: Url::parse("http://localhost:5000").unwrap(),
            app_name: "ShopEasy".to_owned(),
            external_timeout: Duration::from_secs(1),
            email: None,
            payments: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/shopeasy_unused")
            .unwrap();
        let (sender, _receiver) = mpsc::channel(1);

        app(AppState::new(
            config,
            pool,
            None,
            NotificationQueue::from_sender(sender),
        ))
    }

    async fn get(uri: &str) -> axum::response::Response {
        test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_wishlist_requires_login() {
        let response = get("/api/wishlist").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_admin_api_requires_login() {
        let response = get("/api/admin/stats").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_orders_page_redirects_guests_home() {
        let response = get("/orders").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/");
    }

    #[tokio::test]
    async fn test_new_session_has_empty_cart() {
        let response = get("/api/cart").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_guest_current_user() {
        let response = get("/api/current-user").await;
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "authenticated": false })
        );
    }
}
