//! Request middleware and extractors.
//!
//! - `identity` - Caller identity from the `x-user-id` header
//! - `request_id` - Request ID generation and propagation

pub mod identity;
pub mod request_id;

pub use identity::CurrentUser;
pub use request_id::request_id_middleware;
