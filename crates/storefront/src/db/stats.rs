//! Aggregate figures for the back-office dashboard.

use rust_decimal::Decimal;
use sqlx::PgPool;

use shopeasy_core::PaymentStatus;

use super::RepositoryError;
use super::orders::OrderRepository;
use crate::models::DashboardStats;

/// Number of orders shown on the dashboard.
const RECENT_ORDER_LIMIT: i64 = 10;

#[derive(sqlx::FromRow)]
struct CountsRow {
    total_users: i64,
    total_products: i64,
    total_orders: i64,
    total_revenue: Decimal,
}

/// Repository for dashboard statistics.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Collect dashboard totals and the most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn dashboard(&self) -> Result<DashboardStats, RepositoryError> {
        let counts: CountsRow = sqlx::query_as(
            r"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM orders
                 WHERE payment_status = $1) AS total_revenue
            ",
        )
        .bind(PaymentStatus::Completed)
        .fetch_one(self.pool)
        .await?;

        let recent_orders = OrderRepository::new(self.pool)
            .recent(RECENT_ORDER_LIMIT)
            .await?;

        Ok(DashboardStats {
            total_users: counts.total_users,
            total_products: counts.total_products,
            total_orders: counts.total_orders,
            total_revenue: counts.total_revenue,
            recent_orders,
        })
    }
}
