//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `catalog` - Product queries and back-office product management
//! - `checkout` - Atomic order placement from the session cart
//! - `reviews` - Reviews and product rating aggregation
//! - `wishlist` - Saved products
//! - `payments` - Stripe payment intents
//! - `email` - SMTP delivery of transactional email
//! - `notifications` - Background queue in front of `email`

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod email;
pub mod notifications;
pub mod payments;
pub mod reviews;
pub mod wishlist;
