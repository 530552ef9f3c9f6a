//! The session cart.
//!
//! A [`Cart`] is a plain value: the web layer loads it from the session,
//! applies one mutation, and writes it back. Mutations are validated against a
//! [`StockSnapshot`] of the live product row and never touch stored stock;
//! stock only moves when an order is committed.
//!
//! A failed mutation leaves the cart exactly as it was.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Errors returned by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The product has no stock at all.
    #[error("{name} is out of stock")]
    OutOfStock {
        /// Product name, for the message shown to the shopper.
        name: String,
    },
    /// The requested quantity exceeds what is on hand.
    #[error("Not enough stock for {name} (only {available} available)")]
    InsufficientStock {
        /// Product name.
        name: String,
        /// Units currently in stock.
        available: u32,
    },
}

/// Live product data a cart mutation is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub stock: u32,
}

/// One product in the cart.
///
/// Name, price and image are copied at the time the product was added so the
/// cart can be displayed without touching the database. Checkout re-reads the
/// live price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// `Σ price × quantity` over the cart snapshot.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart gets a new line with quantity 1.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] if the product has zero stock.
    /// - [`CartError::InsufficientStock`] if one more unit would exceed stock.
    pub fn add(&mut self, product: &StockSnapshot) -> Result<(), CartError> {
        if product.stock == 0 {
            return Err(CartError::OutOfStock {
                name: product.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == product.id) {
            if line.quantity >= product.stock {
                return Err(CartError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                });
            }
            line.quantity += 1;
            return Ok(());
        }

        self.lines.push(CartLine {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        });
        Ok(())
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    pub fn remove(&mut self, id: ProductId) {
        self.lines.retain(|l| l.id != id);
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// A quantity of zero or less removes the line. Products that are not in
    /// the cart are left alone.
    ///
    /// # Errors
    ///
    /// [`CartError::InsufficientStock`] if `quantity` exceeds current stock.
    pub fn update_quantity(
        &mut self,
        product: &StockSnapshot,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity > i64::from(product.stock) {
            return Err(CartError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
            });
        }

        // Bounded by product.stock (a u32) after the check above
        let Ok(quantity) = u32::try_from(quantity) else {
            self.remove(product.id);
            return Ok(());
        };
        if quantity == 0 {
            self.remove(product.id);
            return Ok(());
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == product.id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
