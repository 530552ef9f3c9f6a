//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use shopeasy_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::products::ReviewView;
use crate::services::reviews::{ReviewInput, ReviewService};
use crate::state::AppState;

/// A product's reviews, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<ReviewView>>> {
    let reviews = ReviewService::new(state.pool()).list(product_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewView::from).collect()))
}

/// Review a product and refresh its rating.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<ReviewInput>,
) -> Result<Json<Value>> {
    let review = ReviewService::new(state.pool()).add(user.id, input).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Review added successfully",
        "review": ReviewView::from(review),
    })))
}
