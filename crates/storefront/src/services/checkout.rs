//! Checkout: turning a session cart into a persisted order.
//!
//! The order header, every line item and every stock decrement commit in one
//! transaction. Product rows are locked `FOR UPDATE` in ascending id order, so
//! two shoppers racing for the last unit serialize and exactly one wins.
//!
//! Order numbers are random. A collision with an existing order aborts the
//! transaction, which is retried with a fresh number.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use shopeasy_core::{
    Cart, OrderNumber, OrderStatus, PaymentStatus, ProductId, ShippingDetails, ShippingError,
    ShippingForm, offline_payment_reference,
};

use super::email::{ConfirmationLine, OrderConfirmation};
use super::payments::{PaymentClient, PaymentIntent};
use crate::db::RepositoryError;
use crate::db::orders::{self, LockedProduct, NewOrder};
use crate::models::{CurrentUser, OrderItem, OrderWithItems};

/// Attempts at finding an unused order number.
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 3;

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to buy.
    #[error("Cart is empty")]
    EmptyCart,

    /// The shipping payload is incomplete or invalid.
    #[error(transparent)]
    Shipping(#[from] ShippingError),

    /// Stock ran out between adding to cart and checking out.
    #[error("Not enough stock for {name}")]
    InsufficientStock { name: String },

    /// A product in the cart has been removed from the catalog.
    #[error("Product {0} is no longer available")]
    ProductUnavailable(ProductId),

    /// Every generated order number collided.
    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A committed order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderWithItems,
    /// Client secret of the payment intent, when the provider produced one.
    pub payment_client_secret: Option<String>,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    payments: Option<&'a PaymentClient>,
}

impl<'a> CheckoutService<'a> {
    /// Create a checkout service. Without a payment client, orders record an
    /// offline payment reference.
    #[must_use]
    pub const fn new(pool: &'a PgPool, payments: Option<&'a PaymentClient>) -> Self {
        Self { pool, payments }
    }

    /// Place an order for everything in `cart`.
    ///
    /// The cart itself is not modified; the caller clears it once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` if the cart has no lines.
    /// - `CheckoutError::Shipping` naming the first missing or invalid field.
    /// - `CheckoutError::InsufficientStock` if live stock cannot cover a line.
    /// - `CheckoutError::ProductUnavailable` if a product was deleted.
    #[instrument(skip(self, user, cart, form), fields(user_id = %user.id, lines = cart.lines().len()))]
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        cart: &Cart,
        form: &ShippingForm,
    ) -> Result<PlacedOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let shipping = form.validate()?;

        let intent = self.create_payment_intent(user, cart.total()).await;
        let payment_id = intent
            .as_ref()
            .map_or_else(offline_payment_reference, |i| i.id.clone());

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = OrderNumber::generate();

            match self
                .commit_order(user, cart, &shipping, &order_number, &payment_id)
                .await
            {
                Ok(order) => {
                    tracing::info!(
                        order_number = %order.order.order_number,
                        total = %order.order.total_amount,
                        "Order placed"
                    );
                    return Ok(PlacedOrder {
                        order,
                        payment_client_secret: intent.and_then(|i| i.client_secret),
                    });
                }
                Err(CheckoutError::Repository(RepositoryError::Conflict(ref field)))
                    if field == "order_number" =>
                {
                    tracing::warn!(attempt, %order_number, "Order number collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(CheckoutError::OrderNumberExhausted)
    }

    /// Best-effort payment intent for the cart snapshot total.
    async fn create_payment_intent(
        &self,
        user: &CurrentUser,
        amount: Decimal,
    ) -> Option<PaymentIntent> {
        let payments = self.payments?;
        let metadata = [
            ("user_id", user.id.to_string()),
            ("user_email", user.email.to_string()),
        ];

        match payments.create_intent(amount, &metadata).await {
            Ok(intent) => Some(intent),
            Err(e) => {
                tracing::warn!(error = %e, "Payment intent failed, recording offline payment");
                None
            }
        }
    }

    /// One checkout transaction. Any error rolls everything back.
    async fn commit_order(
        &self,
        user: &CurrentUser,
        cart: &Cart,
        shipping: &ShippingDetails,
        order_number: &OrderNumber,
        payment_id: &str,
    ) -> Result<OrderWithItems, CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let ids: Vec<ProductId> = cart.lines().iter().map(|l| l.id).collect();
        let locked = orders::lock_products(&mut *tx, &ids).await?;
        let lines = reserve_lines(cart, &locked)?;

        let total_amount: Decimal = lines
            .iter()
            .map(|(product, quantity)| product.price * Decimal::from(*quantity))
            .sum();

        let order = orders::insert_order(
            &mut *tx,
            &NewOrder {
                order_number,
                user_id: user.id,
                total_amount,
                status: OrderStatus::Confirmed,
                payment_status: PaymentStatus::Completed,
                payment_id: Some(payment_id),
                shipping,
            },
        )
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product, quantity) in lines {
            let id =
                orders::insert_item(&mut *tx, order.id, product.id, quantity, product.price).await?;
            orders::decrement_stock(&mut *tx, product.id, quantity).await?;

            items.push(OrderItem {
                id,
                order_id: order.id,
                product_id: product.id,
                product_name: product.name.clone(),
                product_image: product.image_url.clone(),
                quantity,
                price: product.price,
            });
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(OrderWithItems { order, items })
    }
}

/// Match each cart line to its locked product and check stock covers it.
fn reserve_lines<'p>(
    cart: &Cart,
    locked: &'p [LockedProduct],
) -> Result<Vec<(&'p LockedProduct, u32)>, CheckoutError> {
    let by_id: HashMap<ProductId, &LockedProduct> = locked.iter().map(|p| (p.id, p)).collect();

    cart.lines()
        .iter()
        .map(|line| {
            let product = by_id
                .get(&line.id)
                .copied()
                .ok_or(CheckoutError::ProductUnavailable(line.id))?;
            if product.stock < line.quantity {
                return Err(CheckoutError::InsufficientStock {
                    name: product.name.clone(),
                });
            }
            Ok((product, line.quantity))
        })
        .collect()
}

/// Build the confirmation email for a placed order.
#[must_use]
pub fn confirmation_for(order: &OrderWithItems) -> OrderConfirmation {
    let header = &order.order;
    OrderConfirmation {
        to: header.shipping.email.clone(),
        recipient_name: header.shipping.name.clone(),
        order_number: header.order_number.to_string(),
        order_date: header.created_at.format("%B %d, %Y").to_string(),
        lines: order
            .items
            .iter()
            .map(|item| ConfirmationLine {
                name: item.product_name.clone(),
                quantity: item.quantity,
                line_total: format!("{:.2}", item.subtotal()),
            })
            .collect(),
        total: format!("{:.2}", header.total_amount),
        address: header.shipping.address.clone(),
        city: header.shipping.city.clone(),
        state: header.shipping.state.clone(),
        zip: header.shipping.zip.clone(),
        country: header.shipping.country.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopeasy_core::StockSnapshot;

    use super::*;

    fn locked(id: i32, price: Decimal, stock: u32) -> LockedProduct {
        LockedProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price,
            image_url: String::new(),
            stock,
        }
    }

    fn cart_with(lines: &[(i32, u32)]) -> Cart {
        let mut cart = Cart::new();
        for &(id, quantity) in lines {
            let snapshot = StockSnapshot {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                price: Decimal::ONE,
                image: String::new(),
                stock: 100,
            };
            cart.add(&snapshot).unwrap();
            cart.update_quantity(&snapshot, i64::from(quantity)).unwrap();
        }
        cart
    }

    #[test]
    fn test_reserve_lines_uses_live_prices() {
        let cart = cart_with(&[(1, 2), (2, 1)]);
        let products = [
            locked(1, Decimal::new(1_000, 2), 5),
            locked(2, Decimal::new(500, 2), 5),
        ];

        let lines = reserve_lines(&cart, &products).unwrap();
        let total: Decimal = lines
            .iter()
            .map(|(p, q)| p.price * Decimal::from(*q))
            .sum();
        assert_eq!(total, Decimal::new(2_500, 2));
    }

    #[test]
    fn test_reserve_lines_names_short_product() {
        let cart = cart_with(&[(1, 1), (2, 3)]);
        let products = [locked(1, Decimal::ONE, 5), locked(2, Decimal::ONE, 2)];

        let err = reserve_lines(&cart, &products).unwrap_err();
        assert_eq!(err.to_string(), "Not enough stock for Product 2");
    }

    #[test]
    fn test_reserve_lines_detects_deleted_product() {
        let cart = cart_with(&[(1, 1), (9, 1)]);
        let products = [locked(1, Decimal::ONE, 5)];

        let err = reserve_lines(&cart, &products).unwrap_err();
        assert!(matches!(err, CheckoutError::ProductUnavailable(id) if id == ProductId::new(9)));
    }

    #[test]
    fn test_exact_stock_is_enough() {
        let cart = cart_with(&[(1, 3)]);
        let products = [locked(1, Decimal::ONE, 3)];
        assert!(reserve_lines(&cart, &products).is_ok());
    }
}
