//! Catalog prices using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10, 2)` and carried as [`Decimal`] so cart
//! and order totals never pick up binary floating point drift.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices must be at least one cent.
    #[error("price must be at least 0.01 (got {0})")]
    TooLow(Decimal),
    /// Prices are quoted in whole cents.
    #[error("price cannot have more than two decimal places (got {0})")]
    TooPrecise(Decimal),
}

/// A positive price with at most two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// The smallest price a product may have.
    pub const MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Validate a decimal amount as a price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::TooLow`] below 0.01 and [`PriceError::TooPrecise`]
    /// for fractions of a cent.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Self::MIN {
            return Err(PriceError::TooLow(amount));
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise(amount));
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Convert a decimal amount to integer minor units (cents), truncating
/// anything below a cent.
///
/// Returns `None` if the amount is negative or does not fit in an `i64`.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopeasy_core::types::price::to_minor_units;
///
/// assert_eq!(to_minor_units(Decimal::new(2_599, 2)), Some(2_599));
/// ```
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;

    if amount.is_sign_negative() {
        return None;
    }
    (amount * Decimal::ONE_HUNDRED).trunc().to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_is_one_cent() {
        assert_eq!(Price::MIN, Decimal::new(1, 2));
    }

    #[test]
    fn test_accepts_cents() {
        assert!(Price::new(Decimal::new(9_999, 2)).is_ok());
        assert!(Price::new(Decimal::new(1, 2)).is_ok());
        assert!(Price::new(Decimal::new(5, 0)).is_ok());
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(
            Price::new(Decimal::ZERO),
            Err(PriceError::TooLow(Decimal::ZERO))
        );
        assert!(Price::new(Decimal::new(-100, 2)).is_err());
    }

    #[test]
    fn test_rejects_fractional_cents() {
        assert!(matches!(
            Price::new(Decimal::new(10_005, 3)),
            Err(PriceError::TooPrecise(_))
        ));
        // Trailing zeros are not extra precision
        assert!(Price::new(Decimal::new(10_050, 3)).is_ok());
    }

    #[test]
    fn test_display_two_places() {
        let price = Price::new(Decimal::new(5, 0)).unwrap_or(Price(Decimal::ONE));
        assert_eq!(price.to_string(), "5.00");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(2_500, 2)), Some(2_500));
        assert_eq!(to_minor_units(Decimal::new(19_999, 3)), Some(1_999));
        assert_eq!(to_minor_units(Decimal::new(-1, 0)), None);
    }
}
