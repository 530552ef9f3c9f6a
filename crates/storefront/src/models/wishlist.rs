//! Wishlist entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shopeasy_core::ProductId;

/// A saved product, joined with its current catalog fields.
#[derive(Debug, Clone)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
    pub stock: u32,
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Whether the saved product can currently be bought.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
