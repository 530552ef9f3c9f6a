//! Seed the catalog with the starter product list.
//!
//! Products are read from a YAML file (the bundled `data/catalog.yaml` unless
//! `--file` is given), validated in full, then inserted only if the products
//! table is empty.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use shopeasy_core::{Category, Features, Price};
use shopeasy_storefront::db::products::ProductRepository;
use shopeasy_storefront::models::NewProduct;

/// Catalog bundled with the binary.
const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.yaml");

/// One product entry in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub features: Vec<String>,
}

impl SeedProduct {
    fn to_new_product(&self) -> Option<NewProduct> {
        Some(NewProduct {
            name: self.name.trim().to_owned(),
            description: self.description.clone(),
            price: Price::new(self.price).ok()?,
            image_url: self.image_url.clone(),
            category: self.category,
            stock: self.stock,
            features: Features::new(self.features.iter()),
        })
    }
}

/// Problems with a parsed seed file, one message per invalid entry.
#[must_use]
pub fn validate_catalog(products: &[SeedProduct]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, product) in products.iter().enumerate() {
        let label = format!("entry {} ({})", index + 1, product.name);

        if product.name.trim().is_empty() || product.name.chars().count() > 200 {
            errors.push(format!("{label}: name must be 1-200 characters"));
        }
        if let Err(e) = Price::new(product.price) {
            errors.push(format!("{label}: {e}"));
        }
        if product.image_url.chars().count() > 500 {
            errors.push(format!("{label}: image_url exceeds 500 characters"));
        }
        if !(0.0..=5.0).contains(&product.rating) {
            errors.push(format!("{label}: rating must be between 0 and 5"));
        }
    }

    errors
}

/// Parse a seed file.
///
/// # Errors
///
/// Returns the YAML error if the content does not match the seed format.
pub fn parse_catalog(content: &str) -> Result<Vec<SeedProduct>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Seed the catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database operation fails.
pub async fn catalog(pool: &PgPool, file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file {
        Some(file_path) => {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(format!("File not found: {file_path}").into());
            }
            info!(path = %file_path, "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => BUNDLED_CATALOG.to_owned(),
    };

    let products = parse_catalog(&content)?;
    info!(products = products.len(), "Parsed catalog");

    let errors = validate_catalog(&products);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let repo = ProductRepository::new(pool);
    let existing = repo.count().await?;
    if existing > 0 {
        info!(existing, "Products table is not empty, skipping seed");
        return Ok(());
    }

    let mut inserted = 0_usize;
    for product in &products {
        let Some(new_product) = product.to_new_product() else {
            continue;
        };
        repo.create_rated(&new_product, product.rating).await?;
        inserted += 1;
    }

    info!(inserted, "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_is_valid() {
        let products = parse_catalog(BUNDLED_CATALOG).unwrap();
        assert_eq!(products.len(), 21);
        assert!(validate_catalog(&products).is_empty());

        let headphones = &products[0];
        assert_eq!(headphones.name, "Wireless Headphones");
        assert_eq!(headphones.price, Decimal::new(9_999, 2));
        assert_eq!(headphones.category, Category::Electronics);
        assert_eq!(headphones.features.len(), 7);
    }

    #[test]
    fn test_every_category_is_stocked() {
        let products = parse_catalog(BUNDLED_CATALOG).unwrap();
        for category in [
            Category::Electronics,
            Category::Fashion,
            Category::Home,
            Category::Sports,
            Category::Books,
            Category::Toys,
        ] {
            assert!(products.iter().any(|p| p.category == category));
        }
    }

    #[test]
    fn test_invalid_entries_are_reported() {
        let products = parse_catalog(
            r#"
- name: ""
  price: "0"
- name: Fine
  price: "5.00"
  rating: 7
"#,
        )
        .unwrap();

        let errors = validate_catalog(&products);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("name"));
        assert!(errors[2].contains("rating"));
    }
}
