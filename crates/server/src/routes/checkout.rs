//! Checkout initiation route.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::ShippingDetails;
use crate::state::AppState;

/// A created payment session the client should redirect to.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub redirect_url: String,
}

/// Create a hosted payment session for the current user's cart.
///
/// POST /checkout
///
/// The body carries optional shipping fields that ride along as session
/// metadata. Nothing is written locally; the order is created when the
/// processor confirms payment via webhook.
///
/// # Errors
///
/// Returns `NotFound` without a cart, `Conflict` for an empty cart,
/// `Payment` if the processor call fails.
#[instrument(skip(state, shipping))]
pub async fn start(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(shipping): Json<ShippingDetails>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    let session = state.checkout().start_session(user_id, &shipping).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            session_id: session.id,
            redirect_url: session.url,
        }),
    ))
}
