//! Checkout route handler.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use shopeasy_core::ShippingForm;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireAuth, save_cart, take_cart};
use crate::services::checkout::{CheckoutService, confirmation_for};
use crate::services::notifications::Notification;
use crate::state::AppState;

/// Turn the session cart into an order.
///
/// The cart is taken out of the session before the order transaction runs,
/// so concurrent submissions cannot order it twice. If the order fails the
/// cart is put back. Once the order commits nothing else can fail the
/// request; the confirmation email is queued unconditionally.
#[instrument(skip(state, session, form), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(form): Json<ShippingForm>,
) -> Result<Json<Value>> {
    let cart = take_cart(&session).await?;

    let placed = match CheckoutService::new(state.pool(), state.payments())
        .place_order(&user, &cart, &form)
        .await
    {
        Ok(placed) => placed,
        Err(e) => {
            if !cart.is_empty()
                && let Err(restore) = save_cart(&session, &cart).await
            {
                tracing::error!(error = %restore, "Failed to restore cart after checkout failure");
            }
            return Err(e.into());
        }
    };

    state
        .notifications()
        .enqueue(Notification::OrderConfirmation(Box::new(confirmation_for(
            &placed.order,
        ))));

    let order_number = placed.order.order.order_number.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_number", &order_number)]));

    Ok(Json(json!({
        "success": true,
        "message": "Order placed successfully!",
        "order_number": order_number,
        "payment_client_secret": placed.payment_client_secret,
    })))
}
