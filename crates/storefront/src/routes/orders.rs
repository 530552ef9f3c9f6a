//! Order history route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use shopeasy_core::{OrderId, OrderStatus, PaymentStatus, ProductId, ShippingDetails};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{OrderItem, OrderWithItems};
use crate::state::AppState;

/// Format used for order timestamps in JSON and pages.
pub(crate) const ORDER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Order line in the history list.
#[derive(Debug, Serialize)]
pub struct OrderLineView {
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// Order in the history list.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub items: Vec<OrderLineView>,
}

impl From<OrderWithItems> for OrderView {
    fn from(order: OrderWithItems) -> Self {
        let OrderWithItems { order, items } = order;
        Self {
            id: order.id,
            order_number: order.order_number.to_string(),
            total_amount: order.total_amount,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at.format(ORDER_DATE_FORMAT).to_string(),
            items: items
                .into_iter()
                .map(|item| OrderLineView {
                    product_name: item.product_name,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        }
    }
}

/// Order line with product details and subtotal.
#[derive(Debug, Serialize)]
pub struct OrderItemDetailView {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image: String,
    pub quantity: u32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

impl From<OrderItem> for OrderItemDetailView {
    fn from(item: OrderItem) -> Self {
        Self {
            subtotal: item.subtotal(),
            product_id: item.product_id,
            product_name: item.product_name,
            product_image: item.product_image,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// One order with shipping details.
#[derive(Debug, Serialize)]
pub struct OrderDetailView {
    pub id: OrderId,
    pub order_number: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub shipping: ShippingDetails,
    pub items: Vec<OrderItemDetailView>,
}

impl From<OrderWithItems> for OrderDetailView {
    fn from(order: OrderWithItems) -> Self {
        let OrderWithItems { order, items } = order;
        Self {
            id: order.id,
            order_number: order.order_number.to_string(),
            total_amount: order.total_amount,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at.format(ORDER_DATE_FORMAT).to_string(),
            shipping: order.shipping,
            items: items.into_iter().map(OrderItemDetailView::from).collect(),
        }
    }
}

/// The user's orders, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// One order, visible to its owner and to admins.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailView>> {
    let order = OrderRepository::new(state.pool())
        .get_with_items(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if order.order.user_id != user.id && !user.is_admin {
        return Err(AppError::Forbidden("Unauthorized".to_owned()));
    }

    Ok(Json(order.into()))
}
