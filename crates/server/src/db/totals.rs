//! Monetary aggregator: recompute an aggregate's total and item count
//! from its line items.
//!
//! Totals are always derived fresh from the rows, joined against the
//! current catalog price; nothing here adjusts a running counter. The
//! empty aggregate is exactly zero (COALESCE), never NULL.

use cartload_core::Money;
use sqlx::PgExecutor;

use super::RepositoryError;

/// Which line-item table an aggregate reads from.
///
/// The cart/order distinction is a compile-time variant mapped to static
/// SQL; table names are never assembled at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemKind {
    Cart,
    Order,
}

impl LineItemKind {
    const fn totals_sql(self) -> &'static str {
        match self {
            Self::Cart => {
                r"
                SELECT COALESCE(SUM(i.qty * p.price_per_case), 0) AS total,
                       COALESCE(SUM(i.qty), 0)::BIGINT AS total_items
                FROM cart_items i
                JOIN products p ON p.id = i.product_id
                WHERE i.cart_id = $1
                "
            }
            Self::Order => {
                r"
                SELECT COALESCE(SUM(i.qty * p.price_per_case), 0) AS total,
                       COALESCE(SUM(i.qty), 0)::BIGINT AS total_items
                FROM order_items i
                JOIN products p ON p.id = i.product_id
                WHERE i.order_id = $1
                "
            }
        }
    }
}

/// Recomputed aggregate values for a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Totals {
    /// Sum of `qty * price_per_case` over all line items.
    pub total: Money,
    /// Sum of `qty` over all line items.
    pub total_items: i64,
}

/// Recompute totals for one cart or order.
///
/// Read-only; callers persist the result (and own the transaction that
/// makes the mutation-then-recompute sequence atomic).
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn compute(
    executor: impl PgExecutor<'_>,
    kind: LineItemKind,
    owner_id: i32,
) -> Result<Totals, RepositoryError> {
    let totals = sqlx::query_as::<_, Totals>(kind.totals_sql())
        .bind(owner_id)
        .fetch_one(executor)
        .await?;

    Ok(totals)
}
