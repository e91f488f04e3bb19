//! Checkout orchestration.
//!
//! Outbound, `start_session` turns a non-empty cart into a hosted payment
//! session without writing anything locally. Inbound, a verified webhook
//! event re-fetches the session and, if paid, converts the buyer's cart
//! into a paid order and empties the cart in a single transaction.
//!
//! A ledger row keyed by session id makes conversion idempotent: webhook
//! retries and double deliveries find the row and return the original
//! order instead of creating a second one.

use cartload_core::{OrderId, OrderStatus, UserId};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::db;
use crate::db::{RepositoryError, totals::LineItemKind};
use crate::error::AppError;
use crate::models::{Cart, NewOrder, NewOrderItem, OrderWithItems, ShippingDetails};
use crate::payments::{
    CheckoutSessionDetail, CreateSessionRequest, CreatedSession, EventType, PaymentClient,
    PaymentError, PaymentStatus, SessionMetadata, WebhookEvent,
};

/// Result of handling a payment event.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// A paid session became an order and the cart was emptied.
    Completed { order: OrderWithItems, cart: Cart },
    /// The session was already processed; `order` is the original.
    AlreadyProcessed { order: OrderWithItems },
    /// The session is not paid; nothing was written.
    NotPaid { status: PaymentStatus },
    /// The event carries no order-creation semantics.
    Ignored,
}

/// Checkout session creation and paid-session conversion.
pub struct CheckoutService {
    pool: PgPool,
    payments: PaymentClient,
    base_url: String,
}

impl CheckoutService {
    #[must_use]
    pub const fn new(pool: PgPool, payments: PaymentClient, base_url: String) -> Self {
        Self {
            pool,
            payments,
            base_url,
        }
    }

    /// Create a hosted payment session for the user's cart.
    ///
    /// The cart is read, never written: it stays intact until the
    /// processor confirms payment through the webhook.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no cart, `Conflict` if the cart
    /// is empty, `Payment` if the processor call fails.
    #[instrument(skip(self, shipping), fields(user = %user_id))]
    pub async fn start_session(
        &self,
        user_id: UserId,
        shipping: &ShippingDetails,
    ) -> Result<CreatedSession, AppError> {
        let cart = db::carts::find_by_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

        if cart.total_items == 0 {
            return Err(AppError::Conflict("cart is empty".to_string()));
        }

        let amount = cart.total.to_cents().ok_or_else(|| {
            AppError::Internal(format!("cart total {} not representable in cents", cart.total))
        })?;

        let request = CreateSessionRequest {
            client_reference_id: user_id.to_string(),
            amount,
            currency: "usd".to_string(),
            success_url: format!("{}/checkout/success", self.base_url),
            cancel_url: format!("{}/checkout/cancelled", self.base_url),
            metadata: metadata_from_shipping(shipping),
        };

        let session = self.payments.create_session(&request).await?;

        tracing::info!(session_id = %session.id, cart_id = %cart.id, "created checkout session");
        Ok(session)
    }

    /// Handle a verified webhook event.
    ///
    /// Completion events re-fetch the session from the API and convert it;
    /// expiry and failure events are acknowledged without side effects.
    /// The event body names the session but is never trusted for payment
    /// state.
    ///
    /// # Errors
    ///
    /// Returns `Payment` if the session fetch fails, otherwise whatever
    /// conversion returns.
    #[instrument(skip(self, event), fields(event_type = ?event.event_type, session = %event.data.object.id))]
    pub async fn handle_event(&self, event: &WebhookEvent) -> Result<CheckoutOutcome, AppError> {
        match event.event_type {
            EventType::SessionCompleted | EventType::AsyncPaymentSucceeded => {
                let detail = self.payments.fetch_session(&event.data.object.id).await?;
                self.process_confirmation(detail).await
            }
            EventType::SessionExpired | EventType::AsyncPaymentFailed => {
                tracing::info!("checkout session did not complete");
                Ok(CheckoutOutcome::Ignored)
            }
            EventType::Unknown => {
                tracing::debug!("ignoring unrecognized event type");
                Ok(CheckoutOutcome::Ignored)
            }
        }
    }

    /// Convert a paid checkout session into an order and empty the cart.
    ///
    /// The order snapshot, the ledger row, the cart wipe, and the cart
    /// total reset commit together or not at all. A session that already
    /// has a ledger row returns the original order without writing, and a
    /// delivery that loses the cart row race to a concurrent duplicate
    /// finds the winner's ledger row and returns the winner's order.
    ///
    /// # Errors
    ///
    /// Returns `Payment` if the session lacks a usable buyer reference.
    /// When no concurrent delivery converted the session, a missing cart
    /// is `NotFound` and an empty one `Conflict`.
    #[instrument(skip(self, detail), fields(session = %detail.id))]
    pub async fn process_confirmation(
        &self,
        detail: CheckoutSessionDetail,
    ) -> Result<CheckoutOutcome, AppError> {
        if detail.payment_status != PaymentStatus::Paid {
            tracing::info!(status = %detail.payment_status, "session not paid; no order created");
            return Ok(CheckoutOutcome::NotPaid {
                status: detail.payment_status,
            });
        }

        // Replay fast path: the ledger already names the order.
        if let Some(order_id) =
            db::checkout_sessions::find_order_for_session(&self.pool, &detail.id).await?
        {
            tracing::info!(order_id = %order_id, "duplicate confirmation; returning original order");
            return Ok(CheckoutOutcome::AlreadyProcessed {
                order: self.load_order(order_id).await?,
            });
        }

        let user_id = buyer_reference(&detail)?;
        let shipping = shipping_from_metadata(&detail.metadata);

        let mut tx = self.pool.begin().await?;

        let Some(cart) = db::carts::find_by_user_for_update(&mut *tx, user_id).await? else {
            if let Some(order) = self.order_if_processed(tx, &detail.id).await? {
                return Ok(CheckoutOutcome::AlreadyProcessed { order });
            }
            tracing::error!(user = %user_id, "paid checkout session has no matching cart");
            return Err(AppError::NotFound(
                "no cart for paid checkout session".to_string(),
            ));
        };

        let cart_items = db::cart_items::list_for_cart(&mut *tx, cart.id).await?;
        if cart_items.is_empty() {
            // A concurrent delivery that held the cart row lock first has
            // already converted and emptied this cart; the ledger tells
            // that apart from a genuinely empty cart.
            if let Some(order) = self.order_if_processed(tx, &detail.id).await? {
                return Ok(CheckoutOutcome::AlreadyProcessed { order });
            }
            tracing::error!(cart_id = %cart.id, "paid checkout session arrived for an empty cart");
            return Err(AppError::Conflict(
                "cart is empty for paid checkout session".to_string(),
            ));
        }

        let items = cart_items
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                qty: item.qty,
            })
            .collect();

        let created = db::orders::create_with_items(
            &mut *tx,
            &NewOrder {
                user_id,
                total: cart.total,
                status: OrderStatus::Paid,
                shipping,
                checkout_session_id: Some(detail.id.clone()),
                items,
            },
        )
        .await?;

        // Backstop for a concurrent delivery that slipped past the cart
        // guards because the cart was refilled after the winner committed:
        // the ledger's primary key still catches it.
        if let Err(err) =
            db::checkout_sessions::insert(&mut *tx, &detail.id, created.order.id).await
        {
            if let RepositoryError::Conflict(_) = err {
                return match self.order_if_processed(tx, &detail.id).await? {
                    Some(order) => Ok(CheckoutOutcome::AlreadyProcessed { order }),
                    None => Err(AppError::Internal(
                        "processed session vanished after conflict".to_string(),
                    )),
                };
            }
            return Err(err.into());
        }

        db::cart_items::delete_all(&mut *tx, cart.id).await?;
        let totals = db::totals::compute(&mut *tx, LineItemKind::Cart, cart.id.as_i32()).await?;
        let cart = db::carts::update_totals(&mut *tx, cart.id, totals).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %created.order.id,
            total = %created.order.total,
            "checkout completed"
        );
        Ok(CheckoutOutcome::Completed {
            order: created,
            cart,
        })
    }

    /// Abandon a conversion attempt and look the session up in the ledger.
    ///
    /// `Some` means a concurrent delivery already converted the session
    /// and the caller is handling a replay.
    async fn order_if_processed(
        &self,
        tx: Transaction<'_, Postgres>,
        session_id: &str,
    ) -> Result<Option<OrderWithItems>, AppError> {
        tx.rollback().await?;

        let Some(order_id) =
            db::checkout_sessions::find_order_for_session(&self.pool, session_id).await?
        else {
            return Ok(None);
        };

        tracing::warn!(order_id = %order_id, "concurrent duplicate confirmation");
        Ok(Some(self.load_order(order_id).await?))
    }

    async fn load_order(&self, order_id: OrderId) -> Result<OrderWithItems, AppError> {
        let order = db::orders::find(&self.pool, order_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("ledger references missing order {order_id}"))
            })?;
        let items = db::order_items::list_for_order(&self.pool, order_id).await?;

        Ok(OrderWithItems { order, items })
    }
}

/// Extract our user id from the session's buyer reference.
fn buyer_reference(detail: &CheckoutSessionDetail) -> Result<UserId, AppError> {
    detail
        .client_reference_id
        .as_deref()
        .and_then(|raw| raw.parse::<i32>().ok())
        .map(UserId::new)
        .ok_or_else(|| {
            AppError::Payment(PaymentError::Parse(
                "checkout session has no usable client_reference_id".to_string(),
            ))
        })
}

/// Map session metadata onto shipping fields.
///
/// A malformed delivery date is dropped with a warning; a paid session is
/// never rejected over its metadata.
fn shipping_from_metadata(metadata: &SessionMetadata) -> ShippingDetails {
    let delivery_date = metadata
        .delivery_date
        .as_deref()
        .and_then(|raw| match raw.parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(_) => {
                tracing::warn!(raw, "unparseable delivery_date in session metadata");
                None
            }
        });

    ShippingDetails {
        delivery_date,
        address: metadata.address.clone(),
        city: metadata.city.clone(),
        state: metadata.state.clone(),
        zip_code: metadata.zip_code.clone(),
        phone: metadata.phone.clone(),
    }
}

fn metadata_from_shipping(shipping: &ShippingDetails) -> SessionMetadata {
    SessionMetadata {
        delivery_date: shipping.delivery_date.map(|date| date.to_string()),
        address: shipping.address.clone(),
        city: shipping.city.clone(),
        state: shipping.state.clone(),
        zip_code: shipping.zip_code.clone(),
        phone: shipping.phone.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(client_reference_id: Option<&str>) -> CheckoutSessionDetail {
        CheckoutSessionDetail {
            id: "cs_test_abc".to_string(),
            payment_status: PaymentStatus::Paid,
            client_reference_id: client_reference_id.map(String::from),
            metadata: SessionMetadata::default(),
        }
    }

    #[test]
    fn buyer_reference_parses_user_id() {
        let user_id = buyer_reference(&detail(Some("42"))).unwrap();
        assert_eq!(user_id, UserId::new(42));
    }

    #[test]
    fn buyer_reference_rejects_missing_or_garbage() {
        assert!(matches!(
            buyer_reference(&detail(None)),
            Err(AppError::Payment(PaymentError::Parse(_)))
        ));
        assert!(matches!(
            buyer_reference(&detail(Some("not-a-number"))),
            Err(AppError::Payment(PaymentError::Parse(_)))
        ));
    }

    #[test]
    fn shipping_parses_iso_delivery_date() {
        let metadata = SessionMetadata {
            delivery_date: Some("2026-09-01".to_string()),
            city: Some("Springfield".to_string()),
            ..SessionMetadata::default()
        };

        let shipping = shipping_from_metadata(&metadata);
        assert_eq!(
            shipping.delivery_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
        );
        assert_eq!(shipping.city.as_deref(), Some("Springfield"));
    }

    #[test]
    fn shipping_drops_malformed_delivery_date() {
        let metadata = SessionMetadata {
            delivery_date: Some("next tuesday".to_string()),
            ..SessionMetadata::default()
        };

        assert_eq!(shipping_from_metadata(&metadata).delivery_date, None);
    }

    #[test]
    fn metadata_round_trips_shipping_fields() {
        let shipping = ShippingDetails {
            delivery_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            address: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            zip_code: Some("62701".to_string()),
            phone: Some("555-0100".to_string()),
        };

        let back = shipping_from_metadata(&metadata_from_shipping(&shipping));
        assert_eq!(back, shipping);
    }
}
