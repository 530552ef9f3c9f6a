//! ShopEasy Core - Shared domain types and storefront rules.
//!
//! This crate is used by:
//! - `storefront` - The web service (JSON API, pages, admin back-office)
//! - `cli` - Migrations, catalog seeding and admin account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Cart mutation, shipping validation, feature list
//! normalization and order number generation all live here so they can be
//! tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, categories and statuses
//! - [`cart`] - The session cart value object
//! - [`checkout`] - Shipping details and order numbers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{Cart, CartError, CartLine, StockSnapshot};
pub use checkout::{
    OrderNumber, ShippingDetails, ShippingError, ShippingForm, offline_payment_reference,
};
pub use types::*;
