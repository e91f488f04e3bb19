//! Product catalog domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cartload_core::{Money, ProductId};

/// A catalog product. Line items price against `price_per_case`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price of one case, in the store currency.
    pub price_per_case: Money,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
