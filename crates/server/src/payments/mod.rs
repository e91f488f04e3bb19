//! Payment processor integration.
//!
//! Outbound: a REST client for creating and retrieving checkout sessions.
//! Inbound: signature verification and envelope types for the processor's
//! webhook deliveries. The processor hosts the actual payment UI; this
//! service only ever sees session ids and their state.

pub mod client;
pub mod error;
pub mod types;
pub mod webhook;

pub use client::PaymentClient;
pub use error::PaymentError;
pub use types::{
    CheckoutSessionDetail, CreateSessionRequest, CreatedSession, EventType, PaymentStatus,
    SessionMetadata, WebhookEvent,
};
pub use webhook::{SIGNATURE_HEADER, SignatureError, verify_signature};
