//! Database operations for Cartload `PostgreSQL`.
//!
//! ## Tables
//!
//! - `products` - catalog rows the aggregator joins against
//! - `carts` / `cart_items` - one active cart per user plus its line items
//! - `orders` / `order_items` - checkout snapshots and their line items
//! - `processed_checkout_sessions` - idempotency ledger for webhooks
//!
//! Every query function takes an executor as its first argument so the same
//! code runs against the pool or inside an open transaction; the service
//! layer owns transaction boundaries.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p cartload-cli -- migrate
//! ```

pub mod cart_items;
pub mod carts;
pub mod checkout_sessions;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod totals;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., one cart per user).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique-constraint violations into
    /// [`RepositoryError::Conflict`] with the given message.
    pub(crate) fn from_unique_violation(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
