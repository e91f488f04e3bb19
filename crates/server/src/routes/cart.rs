//! Cart routes for the current user.
//!
//! Every mutation responds with the updated cart so clients always see the
//! recomputed totals alongside the change they made.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cartload_core::ProductId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Cart, CartItem, CartWithItems};
use crate::state::AppState;

/// Request to add a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub qty: i32,
}

/// Request to set a line item's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub qty: i32,
}

/// A line-item change together with the recomputed cart.
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub item: CartItem,
    pub cart: Cart,
}

/// Create a cart for the current user.
///
/// POST /cart
///
/// # Errors
///
/// Returns `Conflict` if the user already has one.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<Cart>), AppError> {
    let cart = state.carts().create_cart(user_id).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Fetch the current user's cart with items and totals.
///
/// GET /cart
///
/// # Errors
///
/// Returns `NotFound` if the user has no cart.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CartWithItems>, AppError> {
    let cart = state.carts().cart_for_user(user_id).await?;
    Ok(Json(cart))
}

/// Add a product to the cart; an existing line item accumulates quantity.
///
/// POST /cart/items
///
/// # Errors
///
/// Returns `InvalidQuantity` for `qty < 1`, `NotFound` for a missing cart
/// or product.
#[instrument(skip(state, request))]
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>), AppError> {
    let (item, cart) = state
        .carts()
        .add_item(user_id, request.product_id, request.qty)
        .await?;

    Ok((StatusCode::CREATED, Json(CartItemResponse { item, cart })))
}

/// Set the quantity of an existing line item.
///
/// PATCH /cart/items/{product_id}
///
/// # Errors
///
/// Returns `InvalidQuantity` for `qty < 1`, `NotFound` if the item is not
/// in the cart.
#[instrument(skip(state, request))]
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartItemResponse>, AppError> {
    let (item, cart) = state
        .carts()
        .update_item(user_id, product_id, request.qty)
        .await?;

    Ok(Json(CartItemResponse { item, cart }))
}

/// Remove a line item.
///
/// DELETE /cart/items/{product_id}
///
/// # Errors
///
/// Returns `NotFound` if the item is not in the cart.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Cart>, AppError> {
    let cart = state.carts().remove_item(user_id, product_id).await?;
    Ok(Json(cart))
}

/// Remove every line item from the cart.
///
/// DELETE /cart/items
///
/// # Errors
///
/// Returns `NotFound` if the user has no cart.
#[instrument(skip(state))]
pub async fn empty(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Cart>, AppError> {
    let cart = state.carts().empty_cart(user_id).await?;
    Ok(Json(cart))
}
