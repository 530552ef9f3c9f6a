//! Review repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopeasy_core::{ProductId, ReviewId, UserId};

use super::{RepositoryError, unique_violation};
use crate::models::Review;

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    user_id: UserId,
    product_id: ProductId,
    username: String,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            product_id: r.product_id,
            username: r.username,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT r.id, r.user_id, r.product_id, u.username, r.rating, r.comment, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Insert a review and recompute the product's rating in one transaction.
    ///
    /// The product rating becomes the arithmetic mean of all its reviews. The
    /// product row is locked first so concurrent reviews of one product
    /// serialize and each average sees every committed review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the user already reviewed the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_and_rate(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i16,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<ProductId> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let id: ReviewId = sqlx::query_scalar(
            "INSERT INTO reviews (user_id, product_id, rating, comment) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                return RepositoryError::Conflict("review already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query(
            r"
            UPDATE products
            SET rating = (SELECT AVG(rating)::DOUBLE PRECISION FROM reviews WHERE product_id = $1)
            WHERE id = $1
            ",
        )
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        let row: ReviewRow = sqlx::query_as(
            r"
            SELECT r.id, r.user_id, r.product_id, u.username, r.rating, r.comment, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.id = $1
            ",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Review::from(row))
    }
}
