//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the row types used by
//! the repositories in [`crate::db`].

pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod user;
pub mod wishlist;

pub use order::{AdminOrderSummary, DashboardStats, Order, OrderItem, OrderWithItems};
pub use product::{NewProduct, Product, ProductUpdate};
pub use review::Review;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserWithOrderCount};
pub use wishlist::WishlistItem;
