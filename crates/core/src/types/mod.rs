//! Core types for ShopEasy.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod features;
pub mod id;
pub mod price;
pub mod status;

pub use category::Category;
pub use email::{Email, EmailError};
pub use features::{Features, FeaturesInput};
pub use id::*;
pub use price::{Price, PriceError, to_minor_units};
pub use status::*;
