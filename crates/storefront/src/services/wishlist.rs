//! Wishlist service.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use shopeasy_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::wishlist::{WishlistChange, WishlistRepository};
use crate::models::WishlistItem;

/// Errors from wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// No product has this id.
    #[error("product not found")]
    ProductNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Wishlist service.
pub struct WishlistService<'a> {
    products: ProductRepository<'a>,
    wishlist: WishlistRepository<'a>,
}

impl<'a> WishlistService<'a> {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
            wishlist: WishlistRepository::new(pool),
        }
    }

    /// A user's saved products.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, WishlistError> {
        Ok(self.wishlist.list(user_id).await?)
    }

    /// Add or remove a product, returning what happened and the full wishlist.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ProductNotFound` for an unknown product.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(WishlistChange, Vec<WishlistItem>), WishlistError> {
        if self.products.get(product_id).await?.is_none() {
            return Err(WishlistError::ProductNotFound);
        }

        let change = self.wishlist.toggle(user_id, product_id).await?;
        let items = self.wishlist.list(user_id).await?;
        Ok((change, items))
    }

    /// Remove every saved product.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<(), WishlistError> {
        let removed = self.wishlist.clear(user_id).await?;
        tracing::debug!(removed, "Wishlist cleared");
        Ok(())
    }
}
