//! Catalog service: product queries and back-office product management.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use shopeasy_core::{Category, Features, FeaturesInput, Price, ProductId};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::reviews::ReviewRepository;
use crate::models::{NewProduct, Product, ProductUpdate, Review};

const MAX_NAME_LENGTH: usize = 200;
const MAX_IMAGE_URL_LENGTH: usize = 500;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted product fields are invalid.
    #[error("{0}")]
    Validation(String),

    /// No product has this id.
    #[error("product not found")]
    NotFound,

    /// The product is referenced by past orders and cannot be deleted.
    #[error("product has order history")]
    HasOrderHistory,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Product fields as posted by the back-office.
///
/// On create, `name` and `price` are required. On update, absent fields are
/// left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub features: Option<FeaturesInput>,
}

impl ProductInput {
    /// Validate as a new product, filling defaults for absent optional fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` describing the first invalid field.
    pub fn into_new_product(self) -> Result<NewProduct, CatalogError> {
        let name = match self.name {
            Some(name) => validate_name(name)?,
            None => return Err(invalid("Name and price are required")),
        };
        let price = match self.price {
            Some(price) => validate_price(price)?,
            None => return Err(invalid("Name and price are required")),
        };

        Ok(NewProduct {
            name,
            description: self.description.unwrap_or_default(),
            price,
            image_url: self
                .image_url
                .map(validate_image_url)
                .transpose()?
                .unwrap_or_default(),
            category: self
                .category
                .as_deref()
                .map(validate_category)
                .transpose()?
                .unwrap_or_default(),
            stock: self.stock.map(validate_stock).transpose()?.unwrap_or(0),
            features: self.features.map(Features::from).unwrap_or_default(),
        })
    }

    /// Validate as a partial update.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` describing the first invalid field.
    pub fn into_update(self) -> Result<ProductUpdate, CatalogError> {
        Ok(ProductUpdate {
            name: self.name.map(validate_name).transpose()?,
            description: self.description,
            price: self.price.map(validate_price).transpose()?,
            image_url: self.image_url.map(validate_image_url).transpose()?,
            category: self
                .category
                .as_deref()
                .map(validate_category)
                .transpose()?,
            stock: self.stock.map(validate_stock).transpose()?,
            features: self.features.map(Features::from),
        })
    }
}

fn invalid(message: impl Into<String>) -> CatalogError {
    CatalogError::Validation(message.into())
}

fn validate_name(name: String) -> Result<String, CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("Name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(invalid(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

fn validate_price(price: Decimal) -> Result<Price, CatalogError> {
    Price::new(price).map_err(|e| invalid(e.to_string()))
}

fn validate_image_url(url: String) -> Result<String, CatalogError> {
    if url.chars().count() > MAX_IMAGE_URL_LENGTH {
        return Err(invalid(format!(
            "Image URL must be at most {MAX_IMAGE_URL_LENGTH} characters"
        )));
    }
    Ok(url.trim().to_owned())
}

fn validate_category(category: &str) -> Result<Category, CatalogError> {
    category.parse().map_err(invalid)
}

fn validate_stock(stock: i64) -> Result<u32, CatalogError> {
    // Stock is stored as a Postgres INTEGER
    if stock < 0 || stock > i64::from(i32::MAX) {
        return Err(invalid("Stock must be zero or more"));
    }
    u32::try_from(stock).map_err(|_| invalid("Stock must be zero or more"))
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    reviews: ReviewRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
            reviews: ReviewRepository::new(pool),
        }
    }

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// One product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// One product with its reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id does not exist.
    pub async fn get_with_reviews(
        &self,
        id: ProductId,
    ) -> Result<(Product, Vec<Review>), CatalogError> {
        let product = self.get(id).await?;
        let reviews = self.reviews.list_for_product(id).await?;
        Ok((product, reviews))
    }

    /// Create a product from back-office input.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for invalid input.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: ProductInput) -> Result<Product, CatalogError> {
        let product = input.into_new_product()?;
        let created = self.products.create(&product).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "Product created");
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for invalid input and
    /// `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ProductId, input: ProductInput) -> Result<Product, CatalogError> {
        let update = input.into_update()?;
        if update.is_empty() {
            return self.get(id).await;
        }

        match self.products.update(id, &update).await {
            Ok(product) => Ok(product),
            Err(RepositoryError::NotFound) => Err(CatalogError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Hard-delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist and
    /// `CatalogError::HasOrderHistory` if any order references it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        match self.products.delete(id).await {
            Ok(()) => {
                tracing::info!(product_id = %id, "Product deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(CatalogError::NotFound),
            Err(RepositoryError::Conflict(_)) => Err(CatalogError::HasOrderHistory),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> ProductInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_applies_defaults() {
        let product = input(r#"{"name": "Yoga Mat", "price": 34.99}"#)
            .into_new_product()
            .unwrap();

        assert_eq!(product.name, "Yoga Mat");
        assert_eq!(product.price.amount(), Decimal::new(3_499, 2));
        assert_eq!(product.description, "");
        assert_eq!(product.image_url, "");
        assert_eq!(product.category, Category::Other);
        assert_eq!(product.stock, 0);
        assert!(product.features.as_slice().is_empty());
    }

    #[test]
    fn test_create_requires_name_and_price() {
        let err = input(r#"{"price": 10}"#).into_new_product().unwrap_err();
        assert_eq!(err.to_string(), "Name and price are required");

        let err = input(r#"{"name": "Lamp"}"#).into_new_product().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_create_rejects_sub_cent_price() {
        let err = input(r#"{"name": "Lamp", "price": 0.001}"#)
            .into_new_product()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let err = input(r#"{"name": "Lamp", "price": 0}"#)
            .into_new_product()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_features_accept_string_or_list() {
        let a = input(r#"{"name": "A", "price": 1, "features": "GPS, Waterproof"}"#)
            .into_new_product()
            .unwrap();
        let b = input(r#"{"name": "A", "price": 1, "features": ["GPS", "Waterproof"]}"#)
            .into_new_product()
            .unwrap();
        assert_eq!(a.features, b.features);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = input(r#"{"name": "A", "price": 1, "category": "Groceries"}"#)
            .into_new_product()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_negative_stock_rejected() {
        let err = input(r#"{"stock": -1}"#).into_update().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_update_only_sets_present_fields() {
        let update = input(r#"{"stock": 12, "category": "sports"}"#)
            .into_update()
            .unwrap();
        assert_eq!(update.stock, Some(12));
        assert_eq!(update.category, Some(Category::Sports));
        assert!(update.name.is_none());
        assert!(update.price.is_none());
        assert!(update.features.is_none());
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let err = input(r#"{"name": "   "}"#).into_update().unwrap_err();
        assert_eq!(err.to_string(), "Name cannot be empty");
    }
}
