//! Public catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use shopeasy_core::{Category, ProductId, ReviewId};

use crate::error::Result;
use crate::models::{Product, Review};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Product as shown in the catalog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub category: Category,
    pub stock: u32,
    pub in_stock: bool,
    pub rating: f64,
    pub features: Vec<String>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            in_stock: product.in_stock(),
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image_url,
            category: product.category,
            stock: product.stock,
            rating: product.rating,
            features: product.features,
        }
    }
}

/// Review as shown under a product.
#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub id: ReviewId,
    pub user: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: String,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user: review.username,
            rating: review.rating,
            comment: review.comment,
            created_at: format_review_date(review.created_at),
        }
    }
}

pub(crate) fn format_review_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Product detail with its reviews.
#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    #[serde(flatten)]
    pub product: ProductView,
    pub reviews: Vec<ReviewView>,
}

/// List every product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = CatalogService::new(state.pool()).list().await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// One product with its reviews.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetailView>> {
    let (product, reviews) = CatalogService::new(state.pool())
        .get_with_reviews(id)
        .await?;

    Ok(Json(ProductDetailView {
        product: product.into(),
        reviews: reviews.into_iter().map(ReviewView::from).collect(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_view_shape() {
        let product = Product {
            id: ProductId::new(3),
            name: "Desk Lamp".to_owned(),
            description: "LED".to_owned(),
            price: Decimal::new(4_999, 2),
            image_url: "https://img.example/lamp.jpg".to_owned(),
            category: Category::Home,
            stock: 0,
            rating: 4.5,
            features: vec!["Dimmable".to_owned()],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(ProductView::from(product)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["price"], "49.99");
        assert_eq!(json["image"], "https://img.example/lamp.jpg");
        assert_eq!(json["category"], "Home");
        assert_eq!(json["inStock"], false);
        assert_eq!(json["features"][0], "Dimmable");
    }
}
