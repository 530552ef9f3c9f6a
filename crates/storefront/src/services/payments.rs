//! Stripe payment intents over the REST API.
//!
//! Only intent creation is used: checkout records the intent id on the order
//! and hands the client secret to the browser. Failures never block an order.

use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use shopeasy_core::to_minor_units;

use crate::config::PaymentConfig;

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The amount cannot be expressed in minor units.
    #[error("invalid payment amount: {0}")]
    InvalidAmount(Decimal),

    /// Transport failure or unparseable response.
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("payment provider returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The provider did not answer in time.
    #[error("payment request timed out")]
    Timeout,
}

/// The fields of a created payment intent that the store keeps.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

/// Stripe REST client.
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    config: PaymentConfig,
    timeout: Duration,
}

impl PaymentClient {
    /// Create a client. Every request is bounded by `timeout`.
    #[must_use]
    pub fn new(config: PaymentConfig, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            timeout,
        }
    }

    /// Create a payment intent for `amount` in the configured currency.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` on transport failure, a non-2xx response, or timeout.
    #[instrument(skip(self, metadata), fields(currency = %self.config.currency))]
    pub async fn create_intent(
        &self,
        amount: Decimal,
        metadata: &[(&str, String)],
    ) -> Result<PaymentIntent, PaymentError> {
        let minor_units = to_minor_units(amount).ok_or(PaymentError::InvalidAmount(amount))?;

        let mut params = vec![
            ("amount".to_owned(), minor_units.to_string()),
            ("currency".to_owned(), self.config.currency.clone()),
            (
                "automatic_payment_methods[enabled]".to_owned(),
                "true".to_owned(),
            ),
        ];
        for (key, value) in metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }

        let request = self
            .http
            .post(format!("{}/v1/payment_intents", self.config.api_base))
            .basic_auth(self.config.secret_key.expose_secret(), Some(""))
            .form(&params)
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| PaymentError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let intent: PaymentIntent = response.json().await?;
        tracing::info!(payment_intent = %intent.id, "Payment intent created");
        Ok(intent)
    }
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(api_base: &str) -> PaymentClient {
        PaymentClient::new(
            PaymentConfig {
                secret_key: SecretString::from("sk_test_abcdefghijklmnop".to_owned()),
                currency: "usd".to_owned(),
                api_base: api_base.to_owned(),
            },
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn test_negative_amount_rejected_before_any_request() {
        let err = client("http://127.0.0.1:9")
            .create_intent(Decimal::new(-100, 2), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_an_error() {
        // Port 9 (discard) is closed on test hosts
        let result = client("http://127.0.0.1:9")
            .create_intent(Decimal::new(2_500, 2), &[("user_id", "1".to_owned())])
            .await;
        assert!(matches!(
            result,
            Err(PaymentError::Http(_) | PaymentError::Timeout)
        ));
    }

    #[test]
    fn test_debug_redacts_secret_key() {
        let debug = format!("{:?}", client("https://api.stripe.com"));
        assert!(!debug.contains("sk_test_abcdefghijklmnop"));
    }
}
