//! Product review types.

use chrono::{DateTime, Utc};

use shopeasy_core::{ProductId, ReviewId, UserId};

/// A product review, with the author's username for display.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub username: String,
    /// 1 to 5 stars.
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
