//! Webhook signature verification.
//!
//! Deliveries carry a `Webhook-Signature: t=<unix_ts>,v1=<hex>` header where
//! the signature is HMAC-SHA256 over `"{t}.{raw_body}"` with the shared
//! webhook secret. Verification happens on the raw bytes before any JSON
//! parsing, and stale timestamps are rejected to blunt replay.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

/// Header carrying the payment webhook signature.
pub const SIGNATURE_HEADER: &str = "webhook-signature";

/// Accepted skew between the signature timestamp and the current time.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a webhook delivery fails verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No signature header on the request.
    #[error("missing signature header")]
    Missing,

    /// Header present but not in `t=...,v1=...` form.
    #[error("malformed signature header")]
    Malformed,

    /// Timestamp outside the accepted tolerance.
    #[error("signature timestamp outside tolerance")]
    Stale,

    /// Signature does not match the body.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a webhook signature against the raw request body.
///
/// `now` is the current Unix timestamp. The timestamp check runs first so a
/// replayed delivery is rejected without touching the MAC.
///
/// # Errors
///
/// Returns [`SignatureError`] when the header is malformed, the timestamp is
/// outside [`TIMESTAMP_TOLERANCE_SECS`], or the MAC does not match.
pub fn verify_signature(
    secret: &SecretString,
    header: &str,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let (timestamp, provided) = parse_header(header)?;

    if (now - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(SignatureError::Stale);
    }

    let provided = hex::decode(provided).map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    // verify_slice is constant-time
    mac.verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

/// Build a `t=...,v1=...` signature header for a body.
///
/// Used by tests and local webhook tooling; the processor computes the same
/// value on its side.
#[must_use]
pub fn sign(secret: &SecretString, body: &[u8], timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}

fn parse_header(header: &str) -> Result<(i64, &str), SignatureError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("t=") {
            timestamp = value.parse::<i64>().ok();
        } else if let Some(value) = part.strip_prefix("v1=") {
            signature = Some(value);
        }
    }

    match (timestamp, signature) {
        (Some(timestamp), Some(signature)) => Ok((timestamp, signature)),
        _ => Err(SignatureError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn secret() -> SecretString {
        SecretString::from("whsec_test_secret_for_unit_tests")
    }

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(&secret(), body, NOW);

        assert_eq!(verify_signature(&secret(), &header, body, NOW), Ok(()));
    }

    #[test]
    fn accepts_skew_within_tolerance() {
        let body = b"payload";
        let header = sign(&secret(), body, NOW - TIMESTAMP_TOLERANCE_SECS);

        assert_eq!(verify_signature(&secret(), &header, body, NOW), Ok(()));
    }

    #[test]
    fn rejects_tampered_body() {
        let header = sign(&secret(), b"original", NOW);

        assert_eq!(
            verify_signature(&secret(), &header, b"tampered", NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"payload";
        let header = sign(&SecretString::from("whsec_other"), body, NOW);

        assert_eq!(
            verify_signature(&secret(), &header, body, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let body = b"payload";
        let header = sign(&secret(), body, NOW - TIMESTAMP_TOLERANCE_SECS - 1);

        assert_eq!(
            verify_signature(&secret(), &header, body, NOW),
            Err(SignatureError::Stale)
        );
    }

    #[test]
    fn rejects_future_timestamp() {
        let body = b"payload";
        let header = sign(&secret(), body, NOW + TIMESTAMP_TOLERANCE_SECS + 60);

        assert_eq!(
            verify_signature(&secret(), &header, body, NOW),
            Err(SignatureError::Stale)
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        let cases = ["", "v1=abc", "t=123", "t=notanumber,v1=abc"];

        for header in cases {
            assert_eq!(
                verify_signature(&secret(), header, b"payload", NOW),
                Err(SignatureError::Malformed),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_non_hex_signature() {
        let header = format!("t={NOW},v1=not-hex!");

        assert_eq!(
            verify_signature(&secret(), &header, b"payload", NOW),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn ignores_unknown_header_parts() {
        let body = b"payload";
        let header = format!("{},v0=deadbeef", sign(&secret(), body, NOW));

        assert_eq!(verify_signature(&secret(), &header, body, NOW), Ok(()));
    }
}
