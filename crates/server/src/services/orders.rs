//! Order reads, edits, and status lifecycle.
//!
//! Status transitions are gated here against [`OrderStatus`] predicates;
//! the db layer writes whatever it is told. Item edits recompute the order
//! total inside the same transaction, mirroring the cart service.

use cartload_core::{OrderId, OrderStatus, UserId};
use sqlx::PgPool;
use tracing::instrument;

use crate::db;
use crate::db::totals::LineItemKind;
use crate::error::AppError;
use crate::models::{ItemQuantity, NewOrder, Order, OrderWithItems, ShippingUpdate};

/// Order aggregate operations.
pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its item snapshot in one transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    #[instrument(skip(self, new_order), fields(user = %new_order.user_id))]
    pub async fn create_order(&self, new_order: NewOrder) -> Result<OrderWithItems, AppError> {
        let mut tx = self.pool.begin().await?;
        let created = db::orders::create_with_items(&mut *tx, &new_order).await?;
        tx.commit().await?;

        tracing::info!(order_id = %created.order.id, total = %created.order.total, "created order");
        Ok(created)
    }

    /// Fetch an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order = %order_id))]
    pub async fn get(&self, order_id: OrderId) -> Result<OrderWithItems, AppError> {
        let order = db::orders::find(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;
        let items = db::order_items::list_for_order(&self.pool, order_id).await?;

        Ok(OrderWithItems { order, items })
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, AppError> {
        Ok(db::orders::list_for_user(&self.pool, user_id).await?)
    }

    /// Update shipping fields on an order. Absent fields keep their value.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self, update), fields(order = %order_id))]
    pub async fn update_shipping(
        &self,
        order_id: OrderId,
        update: &ShippingUpdate,
    ) -> Result<Order, AppError> {
        let order = db::orders::update_shipping(&self.pool, order_id, update)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

        Ok(order)
    }

    /// Set quantities on existing order line items and recompute the total.
    ///
    /// Unknown products are skipped with a warning; the update succeeds if
    /// at least one line item matched. Zero is a legal quantity here (an
    /// admin voiding a line), negatives are not.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for an empty update, `InvalidQuantity` for a
    /// negative quantity, `NotFound` if the order or every referenced line
    /// item is missing.
    #[instrument(skip(self, items), fields(order = %order_id, count = items.len()))]
    pub async fn update_items(
        &self,
        order_id: OrderId,
        items: &[ItemQuantity],
    ) -> Result<OrderWithItems, AppError> {
        if items.is_empty() {
            return Err(AppError::BadRequest("no items to update".to_string()));
        }
        for item in items {
            if item.qty < 0 {
                return Err(AppError::InvalidQuantity(item.qty));
            }
        }

        let mut tx = self.pool.begin().await?;

        db::orders::find_for_update(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

        let mut matched = 0;
        for item in items {
            match db::order_items::set_qty(&mut *tx, order_id, item.product_id, item.qty).await? {
                Some(_) => matched += 1,
                None => {
                    tracing::warn!(product = %item.product_id, "skipping unknown order line item");
                }
            }
        }
        if matched == 0 {
            return Err(AppError::NotFound("no matching order items".to_string()));
        }

        let totals = db::totals::compute(&mut *tx, LineItemKind::Order, order_id.as_i32()).await?;
        let order = db::orders::update_total(&mut *tx, order_id, totals.total).await?;
        let items = db::order_items::list_for_order(&mut *tx, order_id).await?;

        tx.commit().await?;

        tracing::info!(total = %order.total, matched, "updated order items");
        Ok(OrderWithItems { order, items })
    }

    /// Mark a paid order as fulfilled.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, `InvalidTransition`
    /// unless the order is currently paid.
    #[instrument(skip(self), fields(order = %order_id))]
    pub async fn mark_fulfilled(&self, order_id: OrderId) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = db::orders::find_for_update(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

        if !order.status.can_fulfill() {
            return Err(AppError::InvalidTransition(format!(
                "cannot fulfill order in status {}",
                order.status
            )));
        }

        let order = db::orders::set_status(&mut *tx, order_id, OrderStatus::Fulfilled).await?;
        tx.commit().await?;

        tracing::info!("order fulfilled");
        Ok(order)
    }

    /// Mark an order as shipped and record its tracking code.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for an empty tracking code, `NotFound` if the
    /// order does not exist, `InvalidTransition` unless the order is paid
    /// or fulfilled.
    #[instrument(skip(self), fields(order = %order_id))]
    pub async fn ship(&self, order_id: OrderId, tracking: &str) -> Result<Order, AppError> {
        if tracking.trim().is_empty() {
            return Err(AppError::BadRequest("tracking code required".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let order = db::orders::find_for_update(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

        if !order.status.can_ship() {
            return Err(AppError::InvalidTransition(format!(
                "cannot ship order in status {}",
                order.status
            )));
        }

        let order = db::orders::ship(&mut *tx, order_id, tracking).await?;
        tx.commit().await?;

        tracing::info!(tracking, "order shipped");
        Ok(order)
    }

    /// Cancel an order.
    ///
    /// Line items stay on the order with their quantities zeroed, the
    /// total is recomputed (to zero) through the same aggregation as every
    /// other edit, and the tracking code is cleared. Shipped orders cannot
    /// be cancelled; cancelling twice fails.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, `InvalidTransition`
    /// if the order is shipped or already cancelled.
    #[instrument(skip(self), fields(order = %order_id))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<OrderWithItems, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = db::orders::find_for_update(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

        if !order.status.can_cancel() {
            return Err(AppError::InvalidTransition(format!(
                "cannot cancel order in status {}",
                order.status
            )));
        }

        let zeroed = db::order_items::zero_all(&mut *tx, order_id).await?;
        let totals = db::totals::compute(&mut *tx, LineItemKind::Order, order_id.as_i32()).await?;
        let order = db::orders::finalize_cancel(&mut *tx, order_id, totals.total).await?;
        let items = db::order_items::list_for_order(&mut *tx, order_id).await?;

        tx.commit().await?;

        tracing::info!(zeroed, "order cancelled");
        Ok(OrderWithItems { order, items })
    }
}
