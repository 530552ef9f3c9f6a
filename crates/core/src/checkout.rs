//! Checkout inputs: shipping details and order numbers.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Email;

/// Errors from validating a [`ShippingForm`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShippingError {
    /// A required field is absent or blank. Holds the wire name of the field.
    #[error("{0} is required")]
    Missing(&'static str),
    /// A field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Wire name of the field.
        field: &'static str,
        /// Maximum allowed characters.
        max: usize,
    },
    /// The shipping email is not a valid address.
    #[error("shipping_email is not a valid email address")]
    InvalidEmail,
}

/// Shipping payload as posted to the checkout endpoint.
///
/// Every field is optional at the wire level so a missing field can be
/// reported by name instead of as a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingForm {
    pub shipping_name: Option<String>,
    pub shipping_email: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_zip: Option<String>,
    pub shipping_country: Option<String>,
    pub shipping_phone: Option<String>,
}

/// Validated shipping snapshot stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}

/// Trim a field and fail with its name if it is blank.
fn required(value: Option<&String>, field: &'static str) -> Result<String, ShippingError> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ShippingError::Missing(field)),
    }
}

fn max_len(value: &str, field: &'static str, max: usize) -> Result<(), ShippingError> {
    if value.chars().count() > max {
        return Err(ShippingError::TooLong { field, max });
    }
    Ok(())
}

impl ShippingForm {
    /// Validate the form.
    ///
    /// Presence is checked first, in the order name, email, address, city,
    /// state, zip, country, phone, and the first missing field is reported.
    /// Lengths and the email format are checked afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShippingError`] encountered.
    pub fn validate(&self) -> Result<ShippingDetails, ShippingError> {
        let details = ShippingDetails {
            name: required(self.shipping_name.as_ref(), "shipping_name")?,
            email: required(self.shipping_email.as_ref(), "shipping_email")?,
            address: required(self.shipping_address.as_ref(), "shipping_address")?,
            city: required(self.shipping_city.as_ref(), "shipping_city")?,
            state: required(self.shipping_state.as_ref(), "shipping_state")?,
            zip: required(self.shipping_zip.as_ref(), "shipping_zip")?,
            country: required(self.shipping_country.as_ref(), "shipping_country")?,
            phone: required(self.shipping_phone.as_ref(), "shipping_phone")?,
        };

        max_len(&details.name, "shipping_name", 200)?;
        max_len(&details.city, "shipping_city", 100)?;
        max_len(&details.state, "shipping_state", 100)?;
        max_len(&details.zip, "shipping_zip", 20)?;
        max_len(&details.country, "shipping_country", 100)?;
        max_len(&details.phone, "shipping_phone", 20)?;

        Email::parse(&details.email).map_err(|_| ShippingError::InvalidEmail)?;

        Ok(details)
    }
}

/// Human-readable public order identifier, `ORD-` followed by eight
/// uppercase hex digits.
///
/// Numbers are random, so uniqueness is enforced by the `orders.order_number`
/// constraint and checkout retries with a fresh number on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a fresh random order number.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("ORD-{:08X}", rand::rng().random::<u32>()))
    }

    /// Wrap an order number read back from storage.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// The order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payment reference recorded when no payment provider produced one.
#[must_use]
pub fn offline_payment_reference() -> String {
    format!("TEST-{:08x}", rand::rng().random::<u32>())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete_form() -> ShippingForm {
        ShippingForm {
            shipping_name: Some("Ada Lovelace".into()),
            shipping_email: Some("ada@example.com".into()),
            shipping_address: Some("12 Analytical Way".into()),
            shipping_city: Some("London".into()),
            shipping_state: Some("Greater London".into()),
            shipping_zip: Some("N1 9GU".into()),
            shipping_country: Some("UK".into()),
            shipping_phone: Some("+44 20 7946 0000".into()),
        }
    }

    #[test]
    fn test_complete_form_validates() {
        let details = complete_form().validate().unwrap();
        assert_eq!(details.name, "Ada Lovelace");
        assert_eq!(details.zip, "N1 9GU");
    }

    #[test]
    fn test_first_missing_field_is_named() {
        let mut form = complete_form();
        form.shipping_city = None;
        form.shipping_phone = None;
        assert_eq!(
            form.validate().unwrap_err(),
            ShippingError::Missing("shipping_city")
        );

        let empty = ShippingForm::default();
        assert_eq!(
            empty.validate().unwrap_err().to_string(),
            "shipping_name is required"
        );
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let mut form = complete_form();
        form.shipping_zip = Some("   ".into());
        assert_eq!(
            form.validate().unwrap_err(),
            ShippingError::Missing("shipping_zip")
        );
    }

    #[test]
    fn test_overlong_phone_rejected() {
        let mut form = complete_form();
        form.shipping_phone = Some("1".repeat(21));
        assert_eq!(
            form.validate().unwrap_err(),
            ShippingError::TooLong {
                field: "shipping_phone",
                max: 20
            }
        );
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut form = complete_form();
        form.shipping_email = Some("not-an-email".into());
        assert_eq!(form.validate().unwrap_err(), ShippingError::InvalidEmail);
    }

    #[test]
    fn test_order_number_format() {
        let number = OrderNumber::generate();
        let s = number.as_str();
        assert_eq!(s.len(), 12);
        assert!(s.starts_with("ORD-"));
        assert!(
            s[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn test_offline_payment_reference_format() {
        let reference = offline_payment_reference();
        assert!(reference.starts_with("TEST-"));
        assert_eq!(reference.len(), 13);
    }
}
