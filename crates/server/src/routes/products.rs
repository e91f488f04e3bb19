//! Product catalog routes.

use axum::{
    Json,
    extract::{Path, State},
};
use cartload_core::ProductId;
use tracing::instrument;

use crate::db;
use crate::error::AppError;
use crate::models::Product;
use crate::state::AppState;

/// List the catalog, ordered by id.
///
/// GET /products
///
/// # Errors
///
/// Returns error if the query fails.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = db::products::list(state.pool()).await?;
    Ok(Json(products))
}

/// Fetch one product.
///
/// GET /products/{id}
///
/// # Errors
///
/// Returns `NotFound` if the product does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    let product = db::products::find(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(Json(product))
}
