//! HTTP client for the payment processor REST API.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;

use crate::config::PaymentConfig;

use super::error::PaymentError;
use super::types::{CheckoutSessionDetail, CreateSessionRequest, CreatedSession};

/// Payment processor API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    api_base: String,
}

impl PaymentClient {
    /// Create a new payment processor client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Parse(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.as_str().trim_end_matches('/').to_owned(),
        })
    }

    /// Retrieve a checkout session by its opaque id.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    pub async fn fetch_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionDetail, PaymentError> {
        let url = format!("{}/v1/checkout/sessions/{session_id}", self.api_base);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }

    /// Create a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreatedSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}
