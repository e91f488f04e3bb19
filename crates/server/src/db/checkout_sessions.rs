//! Database operations for the processed-checkout-session ledger.
//!
//! The ledger makes payment-confirmation handling idempotent: the session
//! id is the primary key, and the insert shares a transaction with order
//! creation, so a duplicate delivery either finds the row or trips the
//! unique constraint.

use cartload_core::OrderId;
use sqlx::PgExecutor;

use super::RepositoryError;

/// Look up the order a checkout session already produced, if any.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn find_order_for_session(
    executor: impl PgExecutor<'_>,
    session_id: &str,
) -> Result<Option<OrderId>, RepositoryError> {
    let order_id = sqlx::query_scalar::<_, OrderId>(
        r"
        SELECT order_id
        FROM processed_checkout_sessions
        WHERE session_id = $1
        ",
    )
    .bind(session_id)
    .fetch_optional(executor)
    .await?;

    Ok(order_id)
}

/// Record that a checkout session has produced an order.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the session was already
/// recorded (concurrent duplicate delivery).
pub async fn insert(
    executor: impl PgExecutor<'_>,
    session_id: &str,
    order_id: OrderId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO processed_checkout_sessions (session_id, order_id)
        VALUES ($1, $2)
        ",
    )
    .bind(session_id)
    .bind(order_id)
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::from_unique_violation(e, "checkout session already processed"))?;

    Ok(())
}
