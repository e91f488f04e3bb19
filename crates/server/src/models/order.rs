//! Order domain types.
//!
//! Orders are created only by the checkout flow, as a snapshot of the cart
//! at payment time. They are never deleted; cancellation zeroes line-item
//! quantities and flips the status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cartload_core::{Money, OrderId, OrderStatus, ProductId, UserId};

/// An order with its denormalized total and lifecycle status.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// User the order belongs to.
    pub user_id: UserId,
    /// Sum of `qty * price_per_case` over all line items.
    pub total: Money,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Requested delivery date.
    pub delivery_date: Option<NaiveDate>,
    /// Shipping street address.
    pub address: Option<String>,
    /// Shipping city.
    pub city: Option<String>,
    /// Shipping state.
    pub state: Option<String>,
    /// Shipping zip code.
    pub zip_code: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Carrier tracking code, set when the order ships.
    pub tracking: Option<String>,
    /// Checkout session that produced this order.
    pub checkout_session_id: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A line item in an order.
///
/// Quantity may be zero after cancellation; the row itself is the record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Order this item belongs to.
    pub order_id: OrderId,
    /// Product reference.
    pub product_id: ProductId,
    /// Number of cases at order time (zeroed on cancellation).
    pub qty: i32,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the quantity last changed.
    pub updated_at: DateTime<Utc>,
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Shipping fields captured at checkout time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub delivery_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
}

/// Partial shipping update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingUpdate {
    pub delivery_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
}

/// Input for one order line item at creation time.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub qty: i32,
}

/// Input for creating an order with its item snapshot.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total: Money,
    pub status: OrderStatus,
    pub shipping: ShippingDetails,
    pub checkout_session_id: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// A (product, quantity) pair for bulk order-item updates.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ItemQuantity {
    pub product_id: ProductId,
    pub qty: i32,
}
