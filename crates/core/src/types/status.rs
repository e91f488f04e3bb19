//! Order lifecycle status.
//!
//! Orders move forward through `PENDING -> PAID -> FULFILLED -> SHIPPED`.
//! `CANCELLED` is reachable from every non-terminal state; `SHIPPED` and
//! `CANCELLED` are terminal. The predicates here are the single source of
//! truth for which transitions the service layer may perform.

use serde::{Deserialize, Serialize};

/// Order status state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Fulfilled,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Shipped | Self::Cancelled)
    }

    /// Cancellation is allowed from any non-terminal state.
    ///
    /// A shipped order is already out the door; it cannot be cancelled,
    /// only returned (out of scope here).
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Fulfillment starts once payment has settled.
    #[must_use]
    pub const fn can_fulfill(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Shipping requires a paid (and possibly fulfilled) order.
    #[must_use]
    pub const fn can_ship(&self) -> bool {
        matches!(self, Self::Paid | Self::Fulfilled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Fulfilled => write!(f, "fulfilled"),
            Self::Shipped => write!(f, "shipped"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Error returned when a string does not name an [`OrderStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid order status: {0}")]
pub struct InvalidOrderStatus(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "fulfilled" => Ok(Self::Fulfilled),
            "shipped" => Ok(Self::Shipped),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(InvalidOrderStatus(s.to_owned())),
        }
    }
}
