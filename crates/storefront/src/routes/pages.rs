//! Server-rendered shell pages.
//!
//! Pages render the initial state; `static/app.js` drives the cart, wishlist,
//! checkout and review interactions through the JSON API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::orders::OrderRepository;
use crate::db::stats::StatsRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth};
use crate::models::CurrentUser;
use crate::routes::admin::DashboardView;
use crate::routes::orders::OrderView;
use crate::routes::products::ProductView;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub app_name: String,
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductView>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub app_name: String,
    pub user: Option<CurrentUser>,
    pub orders: Vec<OrderView>,
}

/// Back-office dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub app_name: String,
    pub user: Option<CurrentUser>,
    pub stats: DashboardView,
}

/// Display the catalog.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let products = CatalogService::new(state.pool()).list().await?;

    Ok(IndexTemplate {
        app_name: state.config().app_name.clone(),
        user,
        products: products.into_iter().map(ProductView::from).collect(),
    })
}

/// Display the user's orders.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersTemplate {
        app_name: state.config().app_name.clone(),
        user: Some(user),
        orders: orders.into_iter().map(OrderView::from).collect(),
    })
}

/// Display the back-office dashboard.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let stats = StatsRepository::new(state.pool()).dashboard().await?;

    Ok(DashboardTemplate {
        app_name: state.config().app_name.clone(),
        user: Some(admin),
        stats: stats.into(),
    })
}
