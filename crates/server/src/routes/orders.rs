//! Order routes.
//!
//! Reads are scoped to the current user; the edit and lifecycle routes
//! operate by order id. Ownership beyond the identity header is enforced
//! upstream by the auth proxy.

use axum::{
    Json,
    extract::{Path, State},
};
use cartload_core::OrderId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{ItemQuantity, Order, OrderWithItems, ShippingUpdate};
use crate::state::AppState;

/// Request to bulk-update line item quantities.
#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    pub items: Vec<ItemQuantity>,
}

/// Request to mark an order shipped.
#[derive(Debug, Deserialize)]
pub struct ShipRequest {
    pub tracking: String,
}

/// List the current user's orders, newest first.
///
/// GET /orders
///
/// # Errors
///
/// Returns error if the query fails.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.orders().list_for_user(user_id).await?;
    Ok(Json(orders))
}

/// Fetch an order with its line items.
///
/// GET /orders/{id}
///
/// # Errors
///
/// Returns `NotFound` if the order does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>, AppError> {
    let order = state.orders().get(id).await?;
    Ok(Json(order))
}

/// Update shipping fields; absent fields keep their value.
///
/// PATCH /orders/{id}/shipping
///
/// # Errors
///
/// Returns `NotFound` if the order does not exist.
#[instrument(skip(state, update))]
pub async fn update_shipping(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(update): Json<ShippingUpdate>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders().update_shipping(id, &update).await?;
    Ok(Json(order))
}

/// Set quantities on existing line items and recompute the total.
///
/// PATCH /orders/{id}/items
///
/// # Errors
///
/// Returns `BadRequest` for an empty list, `InvalidQuantity` for negative
/// quantities, `NotFound` if nothing matched.
#[instrument(skip(state, request))]
pub async fn update_items(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateItemsRequest>,
) -> Result<Json<OrderWithItems>, AppError> {
    let order = state.orders().update_items(id, &request.items).await?;
    Ok(Json(order))
}

/// Mark a paid order as fulfilled.
///
/// POST /orders/{id}/fulfill
///
/// # Errors
///
/// Returns `InvalidTransition` unless the order is paid.
#[instrument(skip(state))]
pub async fn fulfill(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders().mark_fulfilled(id).await?;
    Ok(Json(order))
}

/// Mark an order shipped and record its tracking code.
///
/// POST /orders/{id}/ship
///
/// # Errors
///
/// Returns `InvalidTransition` unless the order is paid or fulfilled.
#[instrument(skip(state, request))]
pub async fn ship(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<ShipRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders().ship(id, &request.tracking).await?;
    Ok(Json(order))
}

/// Cancel an order: zero its items, recompute the total, clear tracking.
///
/// POST /orders/{id}/cancel
///
/// # Errors
///
/// Returns `InvalidTransition` if the order is shipped or already
/// cancelled.
#[instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>, AppError> {
    let order = state.orders().cancel(id).await?;
    Ok(Json(order))
}
