//! Database operations for cart aggregates.
//!
//! The `carts` row carries the denormalized `total` and `total_items`;
//! callers recompute them via [`super::totals`] and persist the result in
//! the same transaction as the line-item change.

use cartload_core::{CartId, UserId};
use sqlx::PgExecutor;

use super::RepositoryError;
use super::totals::Totals;
use crate::models::Cart;

/// Create an empty cart for a user.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the user already has a cart.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<Cart, RepositoryError> {
    let cart = sqlx::query_as::<_, Cart>(
        r"
        INSERT INTO carts (user_id)
        VALUES ($1)
        RETURNING id, user_id, total, total_items, created_at, updated_at
        ",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_unique_violation(e, "user already has a cart"))?;

    Ok(cart)
}

/// Get a user's cart.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn find_by_user(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as::<_, Cart>(
        r"
        SELECT id, user_id, total, total_items, created_at, updated_at
        FROM carts
        WHERE user_id = $1
        ",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(cart)
}

/// Get a user's cart and lock its row for the current transaction.
///
/// Serializes concurrent mutations of the same cart so the
/// recompute-then-persist sequence cannot interleave.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn find_by_user_for_update(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<Option<Cart>, RepositoryError> {
    let cart = sqlx::query_as::<_, Cart>(
        r"
        SELECT id, user_id, total, total_items, created_at, updated_at
        FROM carts
        WHERE user_id = $1
        FOR UPDATE
        ",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(cart)
}

/// Persist recomputed aggregate totals on a cart.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the cart does not exist.
pub async fn update_totals(
    executor: impl PgExecutor<'_>,
    cart_id: CartId,
    totals: Totals,
) -> Result<Cart, RepositoryError> {
    let cart = sqlx::query_as::<_, Cart>(
        r"
        UPDATE carts
        SET total = $2, total_items = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, total, total_items, created_at, updated_at
        ",
    )
    .bind(cart_id)
    .bind(totals.total)
    .bind(totals.total_items)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(cart)
}
