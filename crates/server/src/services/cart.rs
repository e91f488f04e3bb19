//! Cart operations with transactional total recompute.
//!
//! Every mutation follows the same shape: lock the cart row, change the
//! line item, recompute `total` and `total_items` from the rows, persist
//! the new aggregates, commit. The stored totals are never adjusted
//! incrementally.

use cartload_core::{ProductId, UserId};
use sqlx::PgPool;
use tracing::instrument;

use crate::db;
use crate::db::totals::LineItemKind;
use crate::error::AppError;
use crate::models::{Cart, CartItem, CartWithItems};

/// Cart aggregate operations.
pub struct CartService {
    pool: PgPool,
}

impl CartService {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty cart for a user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the user already has a cart.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn create_cart(&self, user_id: UserId) -> Result<Cart, AppError> {
        let cart = db::carts::insert(&self.pool, user_id).await?;

        tracing::info!(cart_id = %cart.id, "created cart");
        Ok(cart)
    }

    /// Fetch a user's cart with its line items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no cart.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn cart_for_user(&self, user_id: UserId) -> Result<CartWithItems, AppError> {
        let cart = db::carts::find_by_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;
        let items = db::cart_items::list_for_cart(&self.pool, cart.id).await?;

        Ok(CartWithItems { cart, items })
    }

    /// Add a product to the user's cart.
    ///
    /// An existing line item for the product accumulates the quantity
    /// instead of erroring.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` if `qty < 1`, `NotFound` if the user has
    /// no cart or the product does not exist.
    #[instrument(skip(self), fields(user = %user_id, product = %product_id, qty))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        qty: i32,
    ) -> Result<(CartItem, Cart), AppError> {
        validate_qty(qty)?;

        let mut tx = self.pool.begin().await?;

        let cart = db::carts::find_by_user_for_update(&mut *tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

        if db::products::price_of(&mut *tx, product_id).await?.is_none() {
            return Err(AppError::NotFound(format!("product {product_id} not found")));
        }

        let item = db::cart_items::upsert_add(&mut *tx, cart.id, product_id, qty).await?;
        let totals = db::totals::compute(&mut *tx, LineItemKind::Cart, cart.id.as_i32()).await?;
        let cart = db::carts::update_totals(&mut *tx, cart.id, totals).await?;

        tx.commit().await?;

        tracing::info!(cart_id = %cart.id, total = %cart.total, "added cart item");
        Ok((item, cart))
    }

    /// Set the quantity of an existing line item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` if `qty < 1`, `NotFound` if the cart or
    /// the line item does not exist.
    #[instrument(skip(self), fields(user = %user_id, product = %product_id, qty))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        qty: i32,
    ) -> Result<(CartItem, Cart), AppError> {
        validate_qty(qty)?;

        let mut tx = self.pool.begin().await?;

        let cart = db::carts::find_by_user_for_update(&mut *tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

        let item = db::cart_items::set_qty(&mut *tx, cart.id, product_id, qty)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id} not in cart")))?;

        let totals = db::totals::compute(&mut *tx, LineItemKind::Cart, cart.id.as_i32()).await?;
        let cart = db::carts::update_totals(&mut *tx, cart.id, totals).await?;

        tx.commit().await?;

        Ok((item, cart))
    }

    /// Remove a line item from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cart or the line item does not exist.
    #[instrument(skip(self), fields(user = %user_id, product = %product_id))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Cart, AppError> {
        let mut tx = self.pool.begin().await?;

        let cart = db::carts::find_by_user_for_update(&mut *tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

        let removed = db::cart_items::delete(&mut *tx, cart.id, product_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound(format!("product {product_id} not in cart")));
        }

        let totals = db::totals::compute(&mut *tx, LineItemKind::Cart, cart.id.as_i32()).await?;
        let cart = db::carts::update_totals(&mut *tx, cart.id, totals).await?;

        tx.commit().await?;

        Ok(cart)
    }

    /// Remove every line item from the user's cart.
    ///
    /// Emptying an already-empty cart succeeds; totals land on zero either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no cart.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn empty_cart(&self, user_id: UserId) -> Result<Cart, AppError> {
        let mut tx = self.pool.begin().await?;

        let cart = db::carts::find_by_user_for_update(&mut *tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

        let removed = db::cart_items::delete_all(&mut *tx, cart.id).await?;
        let totals = db::totals::compute(&mut *tx, LineItemKind::Cart, cart.id.as_i32()).await?;
        let cart = db::carts::update_totals(&mut *tx, cart.id, totals).await?;

        tx.commit().await?;

        tracing::info!(cart_id = %cart.id, removed, "emptied cart");
        Ok(cart)
    }
}

fn validate_qty(qty: i32) -> Result<(), AppError> {
    if qty < 1 {
        return Err(AppError::InvalidQuantity(qty));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_negative_quantities() {
        assert!(matches!(validate_qty(0), Err(AppError::InvalidQuantity(0))));
        assert!(matches!(
            validate_qty(-3),
            Err(AppError::InvalidQuantity(-3))
        ));
        assert!(validate_qty(1).is_ok());
    }
}
