//! Business logic services.
//!
//! # Services
//!
//! - `cart` - Cart line-item mutations with transactional total recompute
//! - `orders` - Order reads, edits, and status lifecycle
//! - `checkout` - Payment session creation and paid-session conversion
//!
//! Services own the connection pool and open transactions; row-level SQL
//! lives in [`crate::db`].

pub mod cart;
pub mod checkout;
pub mod orders;

pub use cart::CartService;
pub use checkout::{CheckoutOutcome, CheckoutService};
pub use orders::OrderService;
