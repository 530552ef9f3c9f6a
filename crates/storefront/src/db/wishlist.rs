//! Wishlist repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopeasy_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::stock_from_db;
use crate::models::WishlistItem;

/// Result of toggling a wishlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

impl WishlistChange {
    /// Lowercase action name reported to clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

#[derive(sqlx::FromRow)]
struct WishlistRow {
    product_id: ProductId,
    name: String,
    price: Decimal,
    image_url: String,
    stock: i32,
    added_at: DateTime<Utc>,
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's saved products, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows: Vec<WishlistRow> = sqlx::query_as(
            r"
            SELECT p.id AS product_id, p.name, p.price, p.image_url, p.stock,
                   w.created_at AS added_at
            FROM wishlist w
            JOIN products p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC, w.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| -> Result<_, RepositoryError> {
                Ok(WishlistItem {
                    product_id: r.product_id,
                    name: r.name,
                    price: r.price,
                    image_url: r.image_url,
                    stock: stock_from_db(r.stock)?,
                    added_at: r.added_at,
                })
            })
            .collect()
    }

    /// Remove the entry if present, otherwise add it.
    ///
    /// Toggles of the same (user, product) pair are serialized with a
    /// transaction-scoped advisory lock, so two concurrent toggles always
    /// report one add and one remove.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let change = if removed > 0 {
            WishlistChange::Removed
        } else {
            sqlx::query(
                "INSERT INTO wishlist (user_id, product_id) VALUES ($1, $2) \
                 ON CONFLICT (user_id, product_id) DO NOTHING",
            )
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
            WishlistChange::Added
        };

        tx.commit().await?;
        Ok(change)
    }

    /// Remove every entry for a user. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_names() {
        assert_eq!(WishlistChange::Added.as_str(), "added");
        assert_eq!(WishlistChange::Removed.as_str(), "removed");
    }
}
