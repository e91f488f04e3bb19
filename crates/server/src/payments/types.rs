//! Wire types for the payment processor API and its webhook events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Payment state of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Expired,
    /// Any status this service does not recognize.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Shipping metadata attached to a checkout session at creation and echoed
/// back on retrieval. All fields are free-form strings on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub delivery_date: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
}

/// A checkout session as returned by the processor's retrieve endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionDetail {
    pub id: String,
    pub payment_status: PaymentStatus,
    /// Buyer reference set at session creation (our user id as a string).
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

/// Request body for creating a hosted checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionRequest {
    pub client_reference_id: String,
    /// Amount due in minor units (cents).
    pub amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: SessionMetadata,
}

/// A freshly created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: String,
    /// Hosted payment page to redirect the buyer to.
    pub url: String,
}

/// Webhook event types this service reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventType {
    #[serde(rename = "checkout.session.completed")]
    SessionCompleted,
    #[serde(rename = "checkout.session.async_payment_succeeded")]
    AsyncPaymentSucceeded,
    #[serde(rename = "checkout.session.expired")]
    SessionExpired,
    #[serde(rename = "checkout.session.async_payment_failed")]
    AsyncPaymentFailed,
    /// Anything else the processor may deliver.
    #[serde(other)]
    Unknown,
}

/// Inbound webhook envelope. Only the event type and the session id are
/// trusted; session state is always re-fetched from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: EventObject,
}

/// The session the event refers to.
#[derive(Debug, Clone, Deserialize)]
pub struct EventObject {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_completed_event() {
        let payload = r#"{
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_test_abc" } }
        }"#;

        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event_type, EventType::SessionCompleted);
        assert_eq!(event.data.object.id, "cs_test_abc");
    }

    #[test]
    fn unrecognized_event_type_parses_as_unknown() {
        let payload = r#"{
            "type": "invoice.payment_succeeded",
            "data": { "object": { "id": "in_123" } }
        }"#;

        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event_type, EventType::Unknown);
    }

    #[test]
    fn parses_session_detail_with_metadata() {
        let payload = r#"{
            "id": "cs_test_abc",
            "payment_status": "paid",
            "client_reference_id": "42",
            "metadata": {
                "delivery_date": "2026-09-01",
                "address": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "zip_code": "62701",
                "phone": "555-0100"
            }
        }"#;

        let detail: CheckoutSessionDetail = serde_json::from_str(payload).unwrap();
        assert_eq!(detail.payment_status, PaymentStatus::Paid);
        assert_eq!(detail.client_reference_id.as_deref(), Some("42"));
        assert_eq!(detail.metadata.city.as_deref(), Some("Springfield"));
    }

    #[test]
    fn missing_metadata_defaults_to_empty() {
        let payload = r#"{
            "id": "cs_test_abc",
            "payment_status": "unpaid",
            "client_reference_id": null
        }"#;

        let detail: CheckoutSessionDetail = serde_json::from_str(payload).unwrap();
        assert_eq!(detail.payment_status, PaymentStatus::Unpaid);
        assert_eq!(detail.metadata, SessionMetadata::default());
    }

    #[test]
    fn unrecognized_payment_status_parses_as_unknown() {
        let payload = r#"{
            "id": "cs_test_abc",
            "payment_status": "no_payment_required"
        }"#;

        let detail: CheckoutSessionDetail = serde_json::from_str(payload).unwrap();
        assert_eq!(detail.payment_status, PaymentStatus::Unknown);
    }
}
