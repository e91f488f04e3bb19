//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::payments::{PaymentClient, PaymentError};
use crate::services::{CartService, CheckoutService, OrderService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the connection
/// pool, and the services built over them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    pool: PgPool,
    carts: CartService,
    orders: OrderService,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment client fails to build.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, PaymentError> {
        let payments = PaymentClient::new(&config.payment)?;
        let carts = CartService::new(pool.clone());
        let orders = OrderService::new(pool.clone());
        let checkout = CheckoutService::new(pool.clone(), payments, config.base_url.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carts,
                orders,
                checkout,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
