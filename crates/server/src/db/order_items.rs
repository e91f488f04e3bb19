//! Database operations for order line items.

use cartload_core::{OrderId, ProductId};
use sqlx::PgExecutor;

use super::RepositoryError;
use crate::models::OrderItem;

/// List an order's line items, ordered by product ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_for_order(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
) -> Result<Vec<OrderItem>, RepositoryError> {
    let items = sqlx::query_as::<_, OrderItem>(
        r"
        SELECT order_id, product_id, qty, created_at, updated_at
        FROM order_items
        WHERE order_id = $1
        ORDER BY product_id
        ",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

/// Set the quantity of an existing order line item.
///
/// Returns `None` if the (order, product) pair does not exist; bulk
/// updates skip unknown pairs.
///
/// # Errors
///
/// Returns error if the database update fails.
pub async fn set_qty(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    product_id: ProductId,
    qty: i32,
) -> Result<Option<OrderItem>, RepositoryError> {
    let item = sqlx::query_as::<_, OrderItem>(
        r"
        UPDATE order_items
        SET qty = $3, updated_at = NOW()
        WHERE order_id = $1 AND product_id = $2
        RETURNING order_id, product_id, qty, created_at, updated_at
        ",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(qty)
    .fetch_optional(executor)
    .await?;

    Ok(item)
}

/// Zero out every line item in an order, keeping the rows.
///
/// Returns the number of rows touched. Zero rows is a valid outcome; an
/// order with no items can still be cancelled.
///
/// # Errors
///
/// Returns error if the database update fails.
pub async fn zero_all(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE order_items
        SET qty = 0, updated_at = NOW()
        WHERE order_id = $1
        ",
    )
    .bind(order_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
