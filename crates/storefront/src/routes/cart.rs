//! Session cart route handlers.
//!
//! The cart lives in the session. Each mutation loads it, checks it against
//! live stock and writes it back; the database is never modified.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use shopeasy_core::{Cart, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{load_cart, save_cart};
use crate::services::catalog::{CatalogError, CatalogService};
use crate::state::AppState;

/// Body naming a single product.
#[derive(Debug, Deserialize)]
pub struct CartProductRequest {
    pub product_id: ProductId,
}

/// Body for a quantity change.
#[derive(Debug, Deserialize)]
pub struct CartUpdateRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

fn cart_response(message: Option<&str>, cart: &Cart) -> Json<Value> {
    let mut body = json!({ "success": true, "cart": cart });
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    Json(body)
}

fn product_not_found(err: CatalogError) -> AppError {
    match err {
        CatalogError::NotFound => AppError::NotFound("Product not found".to_owned()),
        other => other.into(),
    }
}

/// The raw cart lines.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<Cart>> {
    Ok(Json(load_cart(&session).await?))
}

/// Add one unit of a product.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CartProductRequest>,
) -> Result<Json<Value>> {
    let product = CatalogService::new(state.pool())
        .get(body.product_id)
        .await
        .map_err(product_not_found)?;

    let mut cart = load_cart(&session).await?;
    cart.add(&product.stock_snapshot())?;
    save_cart(&session, &cart).await?;

    let product_id = body.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", &product_id)]));

    Ok(cart_response(Some("Added to cart"), &cart))
}

/// Remove a product's line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Json(body): Json<CartProductRequest>) -> Result<Json<Value>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(body.product_id);
    save_cart(&session, &cart).await?;

    Ok(cart_response(None, &cart))
}

/// Set a line's quantity. Zero or less removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CartUpdateRequest>,
) -> Result<Json<Value>> {
    let mut cart = load_cart(&session).await?;

    if body.quantity <= 0 {
        cart.remove(body.product_id);
    } else {
        let product = CatalogService::new(state.pool())
            .get(body.product_id)
            .await
            .map_err(product_not_found)?;
        cart.update_quantity(&product.stock_snapshot(), body.quantity)?;
    }

    save_cart(&session, &cart).await?;

    Ok(cart_response(None, &cart))
}
