//! Wishlist route handlers.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use shopeasy_core::ProductId;

use crate::db::wishlist::WishlistChange;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::WishlistItem;
use crate::services::wishlist::WishlistService;
use crate::state::AppState;

/// Body for a toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub product_id: ProductId,
}

/// Saved product as shown to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemView {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub in_stock: bool,
}

impl From<WishlistItem> for WishlistItemView {
    fn from(item: WishlistItem) -> Self {
        Self {
            in_stock: item.in_stock(),
            id: item.product_id,
            name: item.name,
            price: item.price,
            image: item.image_url,
        }
    }
}

fn views(items: Vec<WishlistItem>) -> Vec<WishlistItemView> {
    items.into_iter().map(WishlistItemView::from).collect()
}

/// The user's saved products.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistItemView>>> {
    let items = WishlistService::new(state.pool()).list(user.id).await?;
    Ok(Json(views(items)))
}

/// Add the product if absent, remove it if present.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<Value>> {
    let (change, items) = WishlistService::new(state.pool())
        .toggle(user.id, body.product_id)
        .await?;

    let message = match change {
        WishlistChange::Added => "Added to wishlist",
        WishlistChange::Removed => "Removed from wishlist",
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "action": change.as_str(),
        "wishlist": views(items),
    })))
}

/// Remove every saved product.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    WishlistService::new(state.pool()).clear(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Wishlist cleared",
    })))
}

