//! Back-office JSON route handlers. Every handler requires an admin.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use shopeasy_core::{Category, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::stats::StatsRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{AdminOrderSummary, DashboardStats, Product, UserWithOrderCount};
use crate::routes::orders::ORDER_DATE_FORMAT;
use crate::services::catalog::{CatalogService, ProductInput};
use crate::state::AppState;

/// Product row in the back-office table.
#[derive(Debug, Serialize)]
pub struct AdminProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub category: Category,
    pub stock: u32,
    pub rating: f64,
}

impl From<Product> for AdminProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            category: product.category,
            stock: product.stock,
            rating: product.rating,
        }
    }
}

/// Order row in the back-office table.
#[derive(Debug, Serialize)]
pub struct AdminOrderView {
    pub id: OrderId,
    pub order_number: String,
    pub user_email: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
}

impl From<AdminOrderSummary> for AdminOrderView {
    fn from(order: AdminOrderSummary) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.to_string(),
            user_email: order.user_email.into_inner(),
            total_amount: order.total_amount,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at.format(ORDER_DATE_FORMAT).to_string(),
        }
    }
}

/// User row in the back-office table.
#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
    pub total_orders: i64,
}

impl From<UserWithOrderCount> for AdminUserView {
    fn from(entry: UserWithOrderCount) -> Self {
        let UserWithOrderCount { user, total_orders } = entry;
        Self {
            id: user.id,
            username: user.username,
            email: user.email.into_inner(),
            is_admin: user.is_admin,
            created_at: user.created_at.format("%Y-%m-%d").to_string(),
            total_orders,
        }
    }
}

/// Dashboard figures.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub recent_orders: Vec<AdminOrderView>,
}

impl From<DashboardStats> for DashboardView {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_products: stats.total_products,
            total_orders: stats.total_orders,
            total_revenue: stats.total_revenue,
            recent_orders: stats
                .recent_orders
                .into_iter()
                .map(AdminOrderView::from)
                .collect(),
        }
    }
}

/// Body for an order status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Every product, for the catalog table.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<AdminProductView>>> {
    let products = CatalogService::new(state.pool()).list().await?;
    Ok(Json(products.into_iter().map(AdminProductView::from).collect()))
}

/// Create a product.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<Json<Value>> {
    let product = CatalogService::new(state.pool()).create(input).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Product added successfully",
        "product_id": product.id,
    })))
}

/// Apply a partial product update.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Value>> {
    CatalogService::new(state.pool()).update(id, input).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Product updated successfully",
    })))
}

/// Delete a product that has never been ordered.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    CatalogService::new(state.pool()).delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}

/// Every order, newest first.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<AdminOrderView>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders.into_iter().map(AdminOrderView::from).collect()))
}

/// Move an order to any status.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Value>> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid status".to_owned()))?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_owned()),
            other => other.into(),
        })?;

    tracing::info!(order_number = %order.order_number, %status, "Order status updated");

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated",
    })))
}

/// Every user with their order count.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<AdminUserView>>> {
    let users = UserRepository::new(state.pool())
        .list_with_order_counts()
        .await?;
    Ok(Json(users.into_iter().map(AdminUserView::from).collect()))
}

/// Dashboard figures as JSON.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<DashboardView>> {
    let stats = StatsRepository::new(state.pool()).dashboard().await?;
    Ok(Json(stats.into()))
}
