//! Database operations for order aggregates.

use cartload_core::{Money, OrderId, OrderStatus, UserId};
use sqlx::{PgConnection, PgExecutor};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, OrderWithItems, ShippingUpdate};

const ORDER_COLUMNS: &str = "id, user_id, total, status, delivery_date, address, city, state, \
                             zip_code, phone, tracking, checkout_session_id, created_at, updated_at";

/// Insert an order and its line-item snapshot.
///
/// Runs on an open connection (normally a transaction) so the order row
/// and all item rows land atomically with the caller's other writes.
///
/// # Errors
///
/// Returns error if any insert fails.
pub async fn create_with_items(
    conn: &mut PgConnection,
    new_order: &NewOrder,
) -> Result<OrderWithItems, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        INSERT INTO orders (
            user_id, total, status, delivery_date, address, city, state,
            zip_code, phone, checkout_session_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {ORDER_COLUMNS}
        ",
    ))
    .bind(new_order.user_id)
    .bind(new_order.total)
    .bind(new_order.status)
    .bind(new_order.shipping.delivery_date)
    .bind(new_order.shipping.address.as_deref())
    .bind(new_order.shipping.city.as_deref())
    .bind(new_order.shipping.state.as_deref())
    .bind(new_order.shipping.zip_code.as_deref())
    .bind(new_order.shipping.phone.as_deref())
    .bind(new_order.checkout_session_id.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(new_order.items.len());
    for item in &new_order.items {
        let row = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO order_items (order_id, product_id, qty)
            VALUES ($1, $2, $3)
            RETURNING order_id, product_id, qty, created_at, updated_at
            ",
        )
        .bind(order.id)
        .bind(item.product_id)
        .bind(item.qty)
        .fetch_one(&mut *conn)
        .await?;
        items.push(row);
    }

    Ok(OrderWithItems { order, items })
}

/// Get an order by ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn find(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders
        WHERE id = $1
        ",
    ))
    .bind(order_id)
    .fetch_optional(executor)
    .await?;

    Ok(order)
}

/// Get an order by ID and lock its row for the current transaction.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn find_for_update(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders
        WHERE id = $1
        FOR UPDATE
        ",
    ))
    .bind(order_id)
    .fetch_optional(executor)
    .await?;

    Ok(order)
}

/// List a user's orders, newest first.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list_for_user(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<Vec<Order>, RepositoryError> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        r"
        SELECT {ORDER_COLUMNS}
        FROM orders
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        ",
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(orders)
}

/// Apply a partial shipping update; `None` fields keep their value.
///
/// Returns `None` if the order does not exist.
///
/// # Errors
///
/// Returns error if the database update fails.
pub async fn update_shipping(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    update: &ShippingUpdate,
) -> Result<Option<Order>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        UPDATE orders
        SET delivery_date = COALESCE($2, delivery_date),
            address = COALESCE($3, address),
            city = COALESCE($4, city),
            state = COALESCE($5, state),
            zip_code = COALESCE($6, zip_code),
            phone = COALESCE($7, phone),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        ",
    ))
    .bind(order_id)
    .bind(update.delivery_date)
    .bind(update.address.as_deref())
    .bind(update.city.as_deref())
    .bind(update.state.as_deref())
    .bind(update.zip_code.as_deref())
    .bind(update.phone.as_deref())
    .fetch_optional(executor)
    .await?;

    Ok(order)
}

/// Persist a recomputed order total.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
pub async fn update_total(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    total: Money,
) -> Result<Order, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        UPDATE orders
        SET total = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        ",
    ))
    .bind(order_id)
    .bind(total)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(order)
}

/// Move an order to a new status.
///
/// Transition legality is the service layer's concern; this just writes.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
pub async fn set_status(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<Order, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        UPDATE orders
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        ",
    ))
    .bind(order_id)
    .bind(status)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(order)
}

/// Mark an order shipped and record its tracking code.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
pub async fn ship(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    tracking: &str,
) -> Result<Order, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        UPDATE orders
        SET status = 'shipped', tracking = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        ",
    ))
    .bind(order_id)
    .bind(tracking)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(order)
}

/// Finalize a cancellation: zero the total, drop tracking, flip status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
pub async fn finalize_cancel(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    total: Money,
) -> Result<Order, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r"
        UPDATE orders
        SET status = 'cancelled', total = $2, tracking = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        ",
    ))
    .bind(order_id)
    .bind(total)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(order)
}
