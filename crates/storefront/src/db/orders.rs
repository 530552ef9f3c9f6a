//! Order repository for database operations.
//!
//! Reads go through [`OrderRepository`]. Order placement runs inside a
//! caller-owned transaction, so its steps are free functions over a
//! [`PgConnection`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use shopeasy_core::{
    Email, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentStatus, ProductId,
    ShippingDetails, UserId,
};

use super::products::stock_from_db;
use super::{RepositoryError, unique_violation};
use crate::models::{AdminOrderSummary, Order, OrderItem, OrderWithItems};

const ORDER_COLUMNS: &str = "id, order_number, user_id, total_amount, status, payment_status, \
     payment_id, shipping_name, shipping_email, shipping_address, shipping_city, \
     shipping_state, shipping_zip, shipping_country, shipping_phone, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    total_amount: Decimal,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_id: Option<String>,
    shipping_name: String,
    shipping_email: String,
    shipping_address: String,
    shipping_city: String,
    shipping_state: String,
    shipping_zip: String,
    shipping_country: String,
    shipping_phone: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id,
            order_number: OrderNumber::from_stored(r.order_number),
            user_id: r.user_id,
            total_amount: r.total_amount,
            status: r.status,
            payment_status: r.payment_status,
            payment_id: r.payment_id,
            shipping: ShippingDetails {
                name: r.shipping_name,
                email: r.shipping_email,
                address: r.shipping_address,
                city: r.shipping_city,
                state: r.shipping_state,
                zip: r.shipping_zip,
                country: r.shipping_country,
                phone: r.shipping_phone,
            },
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    product_image: String,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<ItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(r: ItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(r.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid order item quantity: {}", r.quantity))
        })?;

        Ok(Self {
            id: r.id,
            order_id: r.order_id,
            product_id: r.product_id,
            product_name: r.product_name,
            product_image: r.product_image,
            quantity,
            price: r.price,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdminOrderRow {
    id: OrderId,
    order_number: String,
    user_email: String,
    total_amount: Decimal,
    status: OrderStatus,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminOrderRow> for AdminOrderSummary {
    type Error = RepositoryError;

    fn try_from(r: AdminOrderRow) -> Result<Self, Self::Error> {
        let user_email = Email::parse(&r.user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            order_number: OrderNumber::from_stored(r.order_number),
            user_email,
            total_amount: r.total_amount,
            status: r.status,
            payment_status: r.payment_status,
            created_at: r.created_at,
        })
    }
}

const ITEM_QUERY: &str = r"
    SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
           p.image_url AS product_image, oi.quantity, oi.price
    FROM order_items oi
    JOIN products p ON p.id = oi.product_id
    WHERE oi.order_id = ANY($1)
    ORDER BY oi.order_id, oi.id
";

const ADMIN_ORDER_QUERY: &str = r"
    SELECT o.id, o.order_number, u.email AS user_email, o.total_amount,
           o.status, o.payment_status, o.created_at
    FROM orders o
    JOIN users u ON u.id = o.user_id
    ORDER BY o.created_at DESC, o.id DESC
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let orders: Vec<Order> = rows.into_iter().map(Order::from).collect();
        self.attach_items(orders).await
    }

    /// One order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.attach_items(vec![Order::from(row)]).await?.pop())
    }

    /// Every order with the buyer's email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        let rows: Vec<AdminOrderRow> = sqlx::query_as(ADMIN_ORDER_QUERY)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(AdminOrderSummary::try_from).collect()
    }

    /// The most recent orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        let rows: Vec<AdminOrderRow> = sqlx::query_as(&format!("{ADMIN_ORDER_QUERY} LIMIT $1"))
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(AdminOrderSummary::try_from).collect()
    }

    /// Set an order's fulfillment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }

    async fn attach_items(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let rows: Vec<ItemRow> = sqlx::query_as(ITEM_QUERY)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let item = OrderItem::try_from(row)?;
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderWithItems {
                items: by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }
}

// =============================================================================
// Order placement (transactional)
// =============================================================================

/// A product row locked for the duration of a checkout transaction.
#[derive(Debug, Clone)]
pub struct LockedProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
    pub stock: u32,
}

#[derive(sqlx::FromRow)]
struct LockedRow {
    id: ProductId,
    name: String,
    price: Decimal,
    image_url: String,
    stock: i32,
}

/// Order header to insert.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub order_number: &'a OrderNumber,
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<&'a str>,
    pub shipping: &'a ShippingDetails,
}

/// Lock product rows `FOR UPDATE` in ascending id order.
///
/// Consistent lock order keeps concurrent checkouts from deadlocking. Ids
/// with no matching row are simply absent from the result.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_products(
    conn: &mut PgConnection,
    ids: &[ProductId],
) -> Result<Vec<LockedProduct>, RepositoryError> {
    let rows: Vec<LockedRow> = sqlx::query_as(
        "SELECT id, name, price, image_url, stock FROM products \
         WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|r| -> Result<_, RepositoryError> {
            Ok(LockedProduct {
                id: r.id,
                name: r.name,
                price: r.price,
                image_url: r.image_url,
                stock: stock_from_db(r.stock)?,
            })
        })
        .collect()
}

/// Insert an order header.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict("order_number")` if the order number is
/// already taken, so the caller can retry with a fresh one.
pub async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder<'_>,
) -> Result<Order, RepositoryError> {
    let row: OrderRow = sqlx::query_as(&format!(
        r"
        INSERT INTO orders (
            order_number, user_id, total_amount, status, payment_status, payment_id,
            shipping_name, shipping_email, shipping_address, shipping_city,
            shipping_state, shipping_zip, shipping_country, shipping_phone
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(order.order_number.as_str())
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.payment_id)
    .bind(&order.shipping.name)
    .bind(&order.shipping.email)
    .bind(&order.shipping.address)
    .bind(&order.shipping.city)
    .bind(&order.shipping.state)
    .bind(&order.shipping.zip)
    .bind(&order.shipping.country)
    .bind(&order.shipping.phone)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if unique_violation(&e).as_deref() == Some("orders_order_number_key") {
            return RepositoryError::Conflict("order_number".to_owned());
        }
        RepositoryError::Database(e)
    })?;

    Ok(Order::from(row))
}

/// Insert one order line at the captured unit price.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    product_id: ProductId,
    quantity: u32,
    price: Decimal,
) -> Result<OrderItemId, RepositoryError> {
    let quantity = i32::try_from(quantity)
        .map_err(|_| RepositoryError::Conflict("quantity is too large".to_owned()))?;

    let id: OrderItemId = sqlx::query_scalar(
        "INSERT INTO order_items (order_id, product_id, quantity, price) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Take `quantity` units out of stock. The caller holds the row lock and has
/// already checked availability.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails, including when it
/// would drive stock negative.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    product_id: ProductId,
    quantity: u32,
) -> Result<(), RepositoryError> {
    let quantity = i32::try_from(quantity)
        .map_err(|_| RepositoryError::Conflict("quantity is too large".to_owned()))?;

    sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1")
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
