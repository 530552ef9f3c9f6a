//! Product categories.

use serde::{Deserialize, Serialize};

/// The department a product is listed under.
///
/// Serialized with the same capitalized names shown in the shop navigation
/// (`"Electronics"`, `"Home"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_category", rename_all = "PascalCase")
)]
pub enum Category {
    Electronics,
    Fashion,
    Home,
    Sports,
    Books,
    Toys,
    /// Used when an admin creates a product without choosing a category.
    #[default]
    Other,
}

impl Category {
    /// Every category, in navigation order.
    pub const ALL: [Self; 7] = [
        Self::Electronics,
        Self::Fashion,
        Self::Home,
        Self::Sports,
        Self::Books,
        Self::Toys,
        Self::Other,
    ];

    /// The display name, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Fashion => "Fashion",
            Self::Home => "Home",
            Self::Sports => "Sports",
            Self::Books => "Books",
            Self::Toys => "Toys",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}
