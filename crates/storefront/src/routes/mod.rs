//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Pages
//! GET  /                              - Catalog shell
//! GET  /orders                        - Order history (user)
//! GET  /admin                         - Dashboard (admin)
//!
//! # Account
//! POST /api/register                  - Create account and log in (rate limited)
//! POST /api/login                     - Log in (rate limited)
//! POST /api/logout                    - Log out
//! GET  /api/current-user              - Session user
//!
//! # Catalog
//! GET  /api/products                  - Product list
//! GET  /api/products/{id}             - Product with reviews
//!
//! # Cart (session)
//! GET  /api/cart                      - Cart lines
//! POST /api/cart/add                  - Add one unit
//! POST /api/cart/remove               - Remove a line
//! POST /api/cart/update               - Set quantity
//!
//! # Wishlist (user)
//! GET  /api/wishlist                  - Saved products
//! POST /api/wishlist/toggle           - Add or remove
//! POST /api/wishlist/clear            - Remove all
//!
//! # Orders (user)
//! POST /api/checkout                  - Place order from cart (rate limited)
//! GET  /api/orders                    - Order history
//! GET  /api/orders/{id}               - Order detail (owner or admin)
//!
//! # Reviews
//! GET  /api/reviews/{product_id}      - Product reviews
//! POST /api/reviews/add               - Add review (user, rate limited)
//!
//! # Back-office (admin)
//! GET    /api/admin/products          - Product table
//! POST   /api/admin/products          - Create product
//! PUT    /api/admin/products/{id}     - Update product
//! DELETE /api/admin/products/{id}     - Delete product
//! GET    /api/admin/orders            - Order table
//! PUT    /api/admin/orders/{id}/status - Change order status
//! GET    /api/admin/users             - User table
//! GET    /api/admin/stats             - Dashboard figures
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod pages;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/current-user", get(auth::current_user))
        .merge(limited)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/update", post(cart::update))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/clear", post(wishlist::clear))
}

/// Create the back-office routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", put(admin::update_order_status))
        .route("/users", get(admin::list_users))
        .route("/stats", get(admin::stats))
}

/// Create the rate-limited write routes that touch the order ledger or ratings.
pub fn limited_write_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::place_order))
        .route("/reviews/add", post(reviews::add))
        .layer(api_rate_limiter())
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(account_routes())
        .merge(limited_write_routes())
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/reviews/{product_id}", get(reviews::index))
        .nest("/admin", admin_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/orders", get(pages::orders))
        .route("/admin", get(pages::admin_dashboard))
        .nest("/api", api_routes())
}
