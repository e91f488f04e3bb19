//! Database operations for cart line items.

use cartload_core::{CartId, ProductId};
use sqlx::PgExecutor;

use super::RepositoryError;
use crate::models::CartItem;

/// List a cart's line items, ordered by product ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_for_cart(
    executor: impl PgExecutor<'_>,
    cart_id: CartId,
) -> Result<Vec<CartItem>, RepositoryError> {
    let items = sqlx::query_as::<_, CartItem>(
        r"
        SELECT cart_id, product_id, qty, created_at, updated_at
        FROM cart_items
        WHERE cart_id = $1
        ORDER BY product_id
        ",
    )
    .bind(cart_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

/// Add a line item, accumulating quantity if the product is already in
/// the cart.
///
/// # Errors
///
/// Returns error if the database insert fails.
pub async fn upsert_add(
    executor: impl PgExecutor<'_>,
    cart_id: CartId,
    product_id: ProductId,
    qty: i32,
) -> Result<CartItem, RepositoryError> {
    let item = sqlx::query_as::<_, CartItem>(
        r"
        INSERT INTO cart_items (cart_id, product_id, qty)
        VALUES ($1, $2, $3)
        ON CONFLICT (cart_id, product_id)
        DO UPDATE SET qty = cart_items.qty + EXCLUDED.qty, updated_at = NOW()
        RETURNING cart_id, product_id, qty, created_at, updated_at
        ",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(qty)
    .fetch_one(executor)
    .await?;

    Ok(item)
}

/// Set the quantity of an existing line item.
///
/// Returns `None` if the (cart, product) pair does not exist; this is an
/// update, not an upsert.
///
/// # Errors
///
/// Returns error if the database update fails.
pub async fn set_qty(
    executor: impl PgExecutor<'_>,
    cart_id: CartId,
    product_id: ProductId,
    qty: i32,
) -> Result<Option<CartItem>, RepositoryError> {
    let item = sqlx::query_as::<_, CartItem>(
        r"
        UPDATE cart_items
        SET qty = $3, updated_at = NOW()
        WHERE cart_id = $1 AND product_id = $2
        RETURNING cart_id, product_id, qty, created_at, updated_at
        ",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(qty)
    .fetch_optional(executor)
    .await?;

    Ok(item)
}

/// Remove a line item. Returns the number of rows deleted.
///
/// # Errors
///
/// Returns error if the database delete fails.
pub async fn delete(
    executor: impl PgExecutor<'_>,
    cart_id: CartId,
    product_id: ProductId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM cart_items
        WHERE cart_id = $1 AND product_id = $2
        ",
    )
    .bind(cart_id)
    .bind(product_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Remove every line item in a cart. Returns the number of rows deleted.
///
/// Deleting from an already-empty cart is not an error.
///
/// # Errors
///
/// Returns error if the database delete fails.
pub async fn delete_all(
    executor: impl PgExecutor<'_>,
    cart_id: CartId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM cart_items
        WHERE cart_id = $1
        ",
    )
    .bind(cart_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
