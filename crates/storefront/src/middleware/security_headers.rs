//! Response hardening headers.
//!
//! Every response is framed-out, sniff-proof and isolated. Pages and JSON
//! are never cached because they carry the session's cart and user; files
//! under `/static` are versioned by content hash and may be cached for a year.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content Security Policy for the storefront.
///
/// Scripts, styles and API calls are same-origin only. Product image URLs
/// are admin-entered and may point at any HTTPS host.
const CSP: &str = "default-src 'none'; \
    script-src 'self'; \
    style-src 'self'; \
    img-src 'self' https: data:; \
    connect-src 'self'; \
    form-action 'self'; \
    base-uri 'self'; \
    object-src 'none'; \
    frame-ancestors 'none'";

/// No page uses device APIs.
const PERMISSIONS_POLICY: &str = "camera=(), geolocation=(), microphone=(), payment=(), \
    usb=(), interest-cohort=(), browsing-topics=()";

/// Headers set on every response.
const ALWAYS: [(&str, &str); 4] = [
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    // Third-party product images do not send CORP headers
    ("cross-origin-embedder-policy", "credentialless"),
    ("permissions-policy", PERMISSIONS_POLICY),
];

const STATIC_PREFIX: &str = "/static/";
const STATIC_CACHE: &str = "public, max-age=31536000, immutable";
const DYNAMIC_CACHE: &str = "no-store";

/// Add security and caching headers to every response.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let is_static = request.uri().path().starts_with(STATIC_PREFIX);

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(CSP));

    for (name, value) in ALWAYS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let cache = if is_static { STATIC_CACHE } else { DYNAMIC_CACHE };
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache));

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/api/cart", get(|| async { "[]" }))
            .route("/static/style.css", get(|| async { "body{}" }))
            .layer(middleware::from_fn(security_headers_middleware))
    }

    async fn get_headers(uri: &str) -> axum::http::HeaderMap {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .headers()
            .clone()
    }

    #[tokio::test]
    async fn test_hardening_headers_applied() {
        let headers = get_headers("/api/cart").await;

        assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(
            headers.get("cross-origin-embedder-policy").unwrap(),
            "credentialless"
        );
        let csp = headers.get(CONTENT_SECURITY_POLICY).unwrap().to_str().unwrap();
        assert!(csp.contains("img-src 'self' https: data:"));
        assert!(csp.contains("script-src 'self'"));
    }

    #[tokio::test]
    async fn test_session_responses_not_cached() {
        let headers = get_headers("/api/cart").await;
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "no-store");
    }

    #[tokio::test]
    async fn test_static_assets_cached() {
        let headers = get_headers("/static/style.css").await;
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), STATIC_CACHE);
    }
}
