use thiserror::Error;

/// Errors from the payment processor API.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed (network, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A response or session field could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),
}
