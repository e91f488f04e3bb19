//! Payment webhook intake.
//!
//! The handler verifies the signature over the raw body before parsing
//! anything, so unauthenticated payloads never reach serde or the
//! database. A verified event is acknowledged with 200 even when it has no
//! effect; the processor only retries non-2xx responses.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use cartload_core::OrderId;
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::payments::{SIGNATURE_HEADER, SignatureError, WebhookEvent, verify_signature};
use crate::services::CheckoutOutcome;
use crate::state::AppState;

/// Acknowledgement body for the payment processor.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

/// Receive a payment webhook event.
///
/// POST /webhooks/payment
///
/// # Errors
///
/// Returns `Unauthorized` for a missing or invalid signature,
/// `BadRequest` for an unparseable payload, and whatever event handling
/// returns.
#[instrument(skip(state, headers, body))]
pub async fn payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(SignatureError::Missing)
        .and_then(|signature| {
            verify_signature(
                &state.config().payment.webhook_secret,
                signature,
                &body,
                Utc::now().timestamp(),
            )
        })
        .map_err(|err| AppError::Unauthorized(err.to_string()))?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|err| AppError::BadRequest(format!("invalid webhook payload: {err}")))?;

    let outcome = state.checkout().handle_event(&event).await?;

    let order_id = match outcome {
        CheckoutOutcome::Completed { ref order, .. }
        | CheckoutOutcome::AlreadyProcessed { ref order } => Some(order.order.id),
        CheckoutOutcome::NotPaid { .. } | CheckoutOutcome::Ignored => None,
    };

    Ok(Json(WebhookAck {
        received: true,
        order_id,
    }))
}
