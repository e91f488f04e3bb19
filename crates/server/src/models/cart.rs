//! Cart domain types.
//!
//! A user has at most one active cart. The `total` and `total_items` columns
//! are denormalized aggregates; the service layer recomputes them from line
//! items inside the same transaction as every mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cartload_core::{CartId, Money, ProductId, UserId};

/// A user's cart with its running aggregates.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// Sum of `qty * price_per_case` over all line items.
    pub total: Money,
    /// Sum of `qty` over all line items.
    pub total_items: i64,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A line item in a cart.
///
/// Quantity is always positive; removing an item deletes the row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    /// Cart this item belongs to.
    pub cart_id: CartId,
    /// Product reference.
    pub product_id: ProductId,
    /// Number of cases.
    pub qty: i32,
    /// When the item was first added.
    pub created_at: DateTime<Utc>,
    /// When the quantity last changed.
    pub updated_at: DateTime<Utc>,
}

/// A cart together with its line items, as returned by read endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CartWithItems {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartItem>,
}
