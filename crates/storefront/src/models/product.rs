//! Catalog product types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shopeasy_core::{Category, Features, Price, ProductId, StockSnapshot};

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub category: Category,
    /// Units on hand. Never negative.
    pub stock: u32,
    /// Mean of all review ratings, or 0 when unreviewed.
    pub rating: f64,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least one unit can be bought.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// The live fields a cart mutation is validated against.
    #[must_use]
    pub fn stock_snapshot(&self) -> StockSnapshot {
        StockSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.image_url.clone(),
            stock: self.stock,
        }
    }
}

/// A validated product to insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category: Category,
    pub stock: u32,
    pub features: Features,
}

/// A validated partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub category: Option<Category>,
    pub stock: Option<u32>,
    pub features: Option<Features>,
}

impl ProductUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.features.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: u32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Desk Lamp".to_owned(),
            description: String::new(),
            price: Decimal::new(2_999, 2),
            image_url: "https://img.test/lamp.jpg".to_owned(),
            category: Category::Home,
            stock,
            rating: 4.4,
            features: vec!["LED".to_owned()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_in_stock_follows_stock_count() {
        assert!(product(1).in_stock());
        assert!(!product(0).in_stock());
    }

    #[test]
    fn test_stock_snapshot_copies_live_fields() {
        let snapshot = product(7).stock_snapshot();
        assert_eq!(snapshot.stock, 7);
        assert_eq!(snapshot.price, Decimal::new(2_999, 2));
        assert_eq!(snapshot.image, "https://img.test/lamp.jpg");
    }

    #[test]
    fn test_empty_update_detected() {
        assert!(ProductUpdate::default().is_empty());
        let update = ProductUpdate {
            stock: Some(0),
            ..ProductUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
