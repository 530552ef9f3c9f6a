//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shopeasy_core::{
    Email, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentStatus, ProductId,
    ShippingDetails, UserId,
};

/// A placed order (domain type).
///
/// Only `status` and `payment_status` change after creation.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    /// Sum of item price × quantity at the time the order was placed.
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub shipping: ShippingDetails,
    pub created_at: DateTime<Utc>,
}

/// A line of an order, joined with the product's display fields.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image: String,
    pub quantity: u32,
    /// Unit price captured when the order was placed.
    pub price: Decimal,
}

impl OrderItem {
    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An order and its lines.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Recompute the total from the line items.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::subtotal).sum()
    }
}

/// Order row as listed in the back-office.
#[derive(Debug, Clone)]
pub struct AdminOrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_email: Email,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Back-office dashboard figures.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    /// Sum of totals over orders whose payment completed.
    pub total_revenue: Decimal,
    pub recent_orders: Vec<AdminOrderSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, price: Decimal, quantity: u32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(1),
            product_id: ProductId::new(id),
            product_name: format!("Product {id}"),
            product_image: String::new(),
            quantity,
            price,
        }
    }

    #[test]
    fn test_items_total_matches_order_total() {
        let order = OrderWithItems {
            order: Order {
                id: OrderId::new(1),
                order_number: OrderNumber::from_stored("ORD-0000002A".to_owned()),
                user_id: UserId::new(1),
                total_amount: Decimal::new(2_500, 2),
                status: OrderStatus::Confirmed,
                payment_status: PaymentStatus::Completed,
                payment_id: None,
                shipping: ShippingDetails {
                    name: "A".to_owned(),
                    email: "a@example.com".to_owned(),
                    address: "1 Road".to_owned(),
                    city: "Town".to_owned(),
                    state: "State".to_owned(),
                    zip: "00000".to_owned(),
                    country: "Country".to_owned(),
                    phone: "000".to_owned(),
                },
                created_at: Utc::now(),
            },
            items: vec![
                item(1, Decimal::new(1_000, 2), 2),
                item(2, Decimal::new(500, 2), 1),
            ],
        };

        assert_eq!(order.items_total(), order.order.total_amount);
        assert_eq!(order.items[0].subtotal(), Decimal::new(2_000, 2));
    }
}
