//! Database operations for the product catalog.

use cartload_core::{Money, ProductId};
use sqlx::PgExecutor;

use super::RepositoryError;
use crate::models::Product;

/// List all products, ordered by ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn list(executor: impl PgExecutor<'_>) -> Result<Vec<Product>, RepositoryError> {
    let products = sqlx::query_as::<_, Product>(
        r"
        SELECT id, name, price_per_case, created_at, updated_at
        FROM products
        ORDER BY id
        ",
    )
    .fetch_all(executor)
    .await?;

    Ok(products)
}

/// Get a product by ID.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn find(
    executor: impl PgExecutor<'_>,
    product_id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let product = sqlx::query_as::<_, Product>(
        r"
        SELECT id, name, price_per_case, created_at, updated_at
        FROM products
        WHERE id = $1
        ",
    )
    .bind(product_id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Get just the case price of a product, if it exists.
///
/// Used by the cart service to confirm a product reference before
/// attaching a line item.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn price_of(
    executor: impl PgExecutor<'_>,
    product_id: ProductId,
) -> Result<Option<Money>, RepositoryError> {
    let price = sqlx::query_scalar::<_, Money>(
        r"
        SELECT price_per_case
        FROM products
        WHERE id = $1
        ",
    )
    .bind(product_id)
    .fetch_optional(executor)
    .await?;

    Ok(price)
}

/// Insert a new product.
///
/// # Errors
///
/// Returns error if the database insert fails.
pub async fn insert(
    executor: impl PgExecutor<'_>,
    name: &str,
    price_per_case: Money,
) -> Result<Product, RepositoryError> {
    let product = sqlx::query_as::<_, Product>(
        r"
        INSERT INTO products (name, price_per_case)
        VALUES ($1, $2)
        RETURNING id, name, price_per_case, created_at, updated_at
        ",
    )
    .bind(name)
    .bind(price_per_case)
    .fetch_one(executor)
    .await?;

    Ok(product)
}
