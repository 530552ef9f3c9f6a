//! Product reviews and rating aggregation.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use shopeasy_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::reviews::ReviewRepository;
use crate::models::Review;

const MAX_COMMENT_LENGTH: usize = 1000;

/// Errors from review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Product id or rating absent.
    #[error("Product ID and rating required")]
    MissingFields,

    /// Rating outside 1 to 5.
    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    /// Comment longer than allowed.
    #[error("Comment must be at most {MAX_COMMENT_LENGTH} characters")]
    CommentTooLong,

    /// No product has this id.
    #[error("product not found")]
    ProductNotFound,

    /// The user already reviewed this product.
    #[error("You already reviewed this product")]
    AlreadyReviewed,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Review payload as posted by the shop.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub product_id: Option<ProductId>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// A review that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReview {
    pub product_id: ProductId,
    pub rating: i16,
    pub comment: String,
}

impl ReviewInput {
    /// Validate presence, rating range and comment length.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ReviewError`].
    pub fn validate(self) -> Result<ValidReview, ReviewError> {
        let (Some(product_id), Some(rating)) = (self.product_id, self.rating) else {
            return Err(ReviewError::MissingFields);
        };

        let rating = i16::try_from(rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or(ReviewError::InvalidRating)?;

        let comment = self.comment.unwrap_or_default().trim().to_owned();
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ReviewError::CommentTooLong);
        }

        Ok(ValidReview {
            product_id,
            rating,
            comment,
        })
    }
}

/// Review service.
pub struct ReviewService<'a> {
    reviews: ReviewRepository<'a>,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool),
        }
    }

    /// Reviews of a product, newest first. Unknown products have none.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Repository` if the query fails.
    pub async fn list(&self, product_id: ProductId) -> Result<Vec<Review>, ReviewError> {
        Ok(self.reviews.list_for_product(product_id).await?)
    }

    /// Add a review and recompute the product's rating.
    ///
    /// # Errors
    ///
    /// - Validation errors from [`ReviewInput::validate`].
    /// - `ReviewError::ProductNotFound` for an unknown product.
    /// - `ReviewError::AlreadyReviewed` on a second review by the same user.
    #[instrument(skip(self, input))]
    pub async fn add(&self, user_id: UserId, input: ReviewInput) -> Result<Review, ReviewError> {
        let review = input.validate()?;

        match self
            .reviews
            .create_and_rate(user_id, review.product_id, review.rating, &review.comment)
            .await
        {
            Ok(created) => {
                tracing::info!(review_id = %created.id, product_id = %created.product_id, "Review added");
                Ok(created)
            }
            Err(RepositoryError::NotFound) => Err(ReviewError::ProductNotFound),
            Err(RepositoryError::Conflict(_)) => Err(ReviewError::AlreadyReviewed),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> ReviewInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_review() {
        let review = input(r#"{"product_id": 3, "rating": 5, "comment": " Great "}"#)
            .validate()
            .unwrap();
        assert_eq!(
            review,
            ValidReview {
                product_id: ProductId::new(3),
                rating: 5,
                comment: "Great".to_owned(),
            }
        );
    }

    #[test]
    fn test_comment_is_optional() {
        let review = input(r#"{"product_id": 3, "rating": 1}"#).validate().unwrap();
        assert_eq!(review.comment, "");
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            input(r#"{"rating": 4}"#).validate(),
            Err(ReviewError::MissingFields)
        ));
        assert!(matches!(
            input(r#"{"product_id": 1}"#).validate(),
            Err(ReviewError::MissingFields)
        ));
    }

    #[test]
    fn test_rating_bounds() {
        for bad in [0, 6, -1, 70_000] {
            let json = format!(r#"{{"product_id": 1, "rating": {bad}}}"#);
            assert!(matches!(
                input(&json).validate(),
                Err(ReviewError::InvalidRating)
            ));
        }
    }

    #[test]
    fn test_comment_length_limit() {
        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        let json = serde_json::json!({"product_id": 1, "rating": 3, "comment": long}).to_string();
        assert!(matches!(
            input(&json).validate(),
            Err(ReviewError::CommentTooLong)
        ));
    }
}
