//! Integration tests for Cartload.
//!
//! The suites under `tests/` exercise the service layer against a real
//! `PostgreSQL` database, plus a handful of HTTP smoke tests against a
//! running server. Everything is `#[ignore]`d by default so `cargo test`
//! stays green without infrastructure.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a disposable database
//! export DATABASE_URL=postgres://localhost/cartload_test
//!
//! # Run the database-backed suites
//! cargo test -p cartload-integration-tests -- --ignored
//! ```
//!
//! Migrations are applied on connect. Every test works against its own
//! random user id, so suites can run concurrently on a shared database.

use std::time::Duration;

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use cartload_core::{Money, UserId};
use cartload_server::config::PaymentConfig;
use cartload_server::db;
use cartload_server::models::Product;
use cartload_server::payments::PaymentClient;
use cartload_server::services::{CartService, CheckoutService, OrderService};

/// Shared handles for a database-backed test.
pub struct TestContext {
    pub pool: PgPool,
    pub carts: CartService,
    pub orders: OrderService,
    pub checkout: CheckoutService,
}

impl TestContext {
    /// Connect to the test database and bring its schema up to date.
    ///
    /// # Panics
    ///
    /// Panics if no database URL is set or the database is unreachable;
    /// these tests cannot run without `PostgreSQL`.
    pub async fn new() -> Self {
        let database_url: SecretString = std::env::var("CARTLOAD_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("set CARTLOAD_DATABASE_URL or DATABASE_URL to run integration tests")
            .into();

        let pool = db::create_pool(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../server/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let payments =
            PaymentClient::new(&payment_config()).expect("Failed to build payment client");

        Self {
            carts: CartService::new(pool.clone()),
            orders: OrderService::new(pool.clone()),
            checkout: CheckoutService::new(
                pool.clone(),
                payments,
                "http://localhost:8080".to_string(),
            ),
            pool,
        }
    }

    /// A user id no other test will collide with.
    ///
    /// Identity is external to this service, so any fresh positive i32
    /// works as a user.
    #[must_use]
    pub fn unique_user() -> UserId {
        let (hi, _) = Uuid::new_v4().as_u64_pair();
        UserId::new(i32::try_from(hi >> 33).map_or(1, |v| v.max(1)))
    }

    /// Insert a throwaway catalog product.
    ///
    /// # Panics
    ///
    /// Panics if the price does not parse or the insert fails.
    pub async fn seed_product(&self, name: &str, price: &str) -> Product {
        let price = Money::new(price.parse().expect("test price must parse"));
        db::products::insert(&self.pool, name, price)
            .await
            .expect("Failed to seed product")
    }
}

/// Processor config for tests that never reach the payment API.
fn payment_config() -> PaymentConfig {
    PaymentConfig {
        api_base: "https://pay.test.example"
            .parse()
            .expect("static URL must parse"),
        secret_key: SecretString::from("sk_aB3xY9mK2nL5pQ7r"),
        webhook_secret: SecretString::from("whs_aB3xY9mK2nL5pQ7"),
        timeout: Duration::from_secs(2),
    }
}

/// A checkout session id unique to this test run.
#[must_use]
pub fn unique_session_id() -> String {
    format!("cs_test_{}", Uuid::new_v4().simple())
}
