//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (database ping)
//!
//! # Products
//! GET    /products                    - Catalog listing
//! GET    /products/{id}               - Product detail
//!
//! # Cart (current user via x-user-id)
//! POST   /cart                        - Create cart
//! GET    /cart                        - Cart with items and totals
//! POST   /cart/items                  - Add item (accumulates quantity)
//! PATCH  /cart/items/{product_id}     - Set item quantity
//! DELETE /cart/items/{product_id}     - Remove item
//! DELETE /cart/items                  - Empty cart
//!
//! # Checkout
//! POST   /checkout                    - Create a hosted payment session
//!
//! # Orders
//! GET    /orders                      - Current user's orders
//! GET    /orders/{id}                 - Order with items
//! PATCH  /orders/{id}/shipping        - Partial shipping update
//! PATCH  /orders/{id}/items           - Bulk item quantity update
//! POST   /orders/{id}/fulfill         - PAID -> FULFILLED
//! POST   /orders/{id}/ship            - Record tracking, -> SHIPPED
//! POST   /orders/{id}/cancel          - Zero items, -> CANCELLED
//!
//! # Webhooks
//! POST   /webhooks/payment            - Signature-gated payment events
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::create).get(cart::show))
        .route("/items", post(cart::add_item).delete(cart::empty))
        .route(
            "/items/{product_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/shipping", patch(orders::update_shipping))
        .route("/{id}/items", patch(orders::update_items))
        .route("/{id}/fulfill", post(orders::fulfill))
        .route("/{id}/ship", post(orders::ship))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payment", post(webhooks::payment))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::start))
        .nest("/orders", order_routes())
        .nest("/webhooks", webhook_routes())
}
