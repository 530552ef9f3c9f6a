//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopeasy_core::{Category, ProductId};

use super::{RepositoryError, is_foreign_key_violation};
use crate::models::{NewProduct, Product, ProductUpdate};

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image_url, category, stock, rating, features, created_at";

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    category: Category,
    stock: i32,
    rating: f64,
    features: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            image_url: r.image_url,
            category: r.category,
            stock: stock_from_db(r.stock)?,
            rating: r.rating,
            features: r.features,
            created_at: r.created_at,
        })
    }
}

/// Convert a stored stock count, which the schema keeps non-negative.
pub(crate) fn stock_from_db(stock: i32) -> Result<u32, RepositoryError> {
    u32::try_from(stock)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative stock in database: {stock}")))
}

fn stock_to_db(stock: u32) -> Result<i32, RepositoryError> {
    i32::try_from(stock).map_err(|_| RepositoryError::Conflict("stock is too large".to_owned()))
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Insert a product. New products start unrated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products (name, description, price, image_url, category, stock, features) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(&product.image_url)
        .bind(product.category)
        .bind(stock_to_db(product.stock)?)
        .bind(product.features.as_slice())
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }

    /// Insert a product with a preset rating. Used when seeding the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_rated(
        &self,
        product: &NewProduct,
        rating: f64,
    ) -> Result<Product, RepositoryError> {
        let created = self.create(product).await?;

        let row: ProductRow = sqlx::query_as(&format!(
            "UPDATE products SET rating = $2 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(created.id)
        .bind(rating)
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }

    /// Apply a partial update. Absent fields keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let stock = update.stock.map(stock_to_db).transpose()?;

        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                image_url = COALESCE($5, image_url),
                category = COALESCE($6, category),
                stock = COALESCE($7, stock),
                features = COALESCE($8, features)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price.map(|p| p.amount()))
        .bind(update.image_url.as_deref())
        .bind(update.category)
        .bind(stock)
        .bind(update.features.as_ref().map(|f| f.as_slice().to_vec()))
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// Hard-delete a product. Its reviews and wishlist entries cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if any order references it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return RepositoryError::Conflict("product has order history".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
