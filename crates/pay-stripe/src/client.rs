//! # Stripe REST Client
//!
//! Thin HTTP plumbing over the Stripe API: authentication headers,
//! form-encoded POSTs with idempotency keys, response decoding and error
//! classification. Endpoint-specific calls live in `charges` and `checkout`.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use pay_core::{
    CardError, CheckoutSession, Customer, NewCheckoutSession, OffSessionCharge, PaymentError,
    PaymentIntent, PaymentMethod, PaymentProvider, PaymentResult, WebhookEvent,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

pub(crate) const PROVIDER: &str = "stripe";

/// Stripe API client implementing [`PaymentProvider`]
pub struct StripeClient {
    pub(crate) config: StripeConfig,
    client: Client,
}

impl StripeClient {
    /// Create a new client. Fails only if the TLS backend cannot initialise.
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> PaymentResult<T> {
        debug!("Stripe GET {}", path);

        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(response).await
    }

    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> PaymentResult<T> {
        // A fresh key per call: repeated requests are never deduplicated.
        let idempotency_key = Uuid::new_v4().to_string();
        debug!("Stripe POST {} (idempotency_key={})", path, idempotency_key);

        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> PaymentResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> PaymentError {
        if err.is_timeout() {
            error!("Stripe request timed out: {}", err);
            PaymentError::Timeout(self.config.timeout.as_secs())
        } else {
            error!("Stripe request failed: {}", err);
            PaymentError::NetworkError(err.to_string())
        }
    }
}

// =============================================================================
// Stripe Error Decoding
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: serde_json::Value,
}

/// Turn a non-2xx Stripe response into a [`PaymentError`].
///
/// `card_error` responses keep their full structure, since the caller needs
/// the attached payment intent and payment method to resume on-session.
pub(crate) fn api_error(status: u16, body: &str) -> PaymentError {
    let Ok(StripeErrorResponse { error: err }) = serde_json::from_str::<StripeErrorResponse>(body)
    else {
        error!("Stripe API error: status={}, body={}", status, body);
        return PaymentError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("HTTP {}: {}", status, body),
        };
    };

    let error_type = err.get("type").and_then(|v| v.as_str()).unwrap_or_default();
    let message = err
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown error")
        .to_string();

    if error_type == "card_error" {
        let card_error = serde_json::from_value::<CardError>(err.clone()).unwrap_or_else(|e| {
            warn!("Partially unreadable Stripe card error: {}", e);
            partial_card_error(&err, message)
        });
        debug!("Stripe card error: {}", card_error);
        return card_error.into();
    }

    error!(
        "Stripe API error: status={}, type={}, message={}",
        status, error_type, message
    );

    PaymentError::ProviderError {
        provider: PROVIDER.to_string(),
        message,
    }
}

/// Salvage the decline code and the intent from a card error whose attached
/// objects did not decode as a whole
fn partial_card_error(err: &serde_json::Value, message: String) -> CardError {
    let text = |key: &str| err.get(key).and_then(|v| v.as_str()).map(String::from);
    let object = |key: &str| err.get(key).cloned().filter(|v| !v.is_null());

    CardError {
        code: text("code"),
        decline_code: text("decline_code"),
        message,
        payment_method: object("payment_method").and_then(|v| serde_json::from_value(v).ok()),
        payment_intent: object("payment_intent").and_then(|v| serde_json::from_value(v).ok()),
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    #[instrument(skip(self))]
    async fn list_card_payment_methods(
        &self,
        customer_id: &str,
    ) -> PaymentResult<Vec<PaymentMethod>> {
        self.list_payment_methods(customer_id, "card").await
    }

    #[instrument(skip(self, charge), fields(customer_id = %charge.customer_id))]
    async fn charge_off_session(&self, charge: &OffSessionCharge) -> PaymentResult<PaymentIntent> {
        self.create_off_session_intent(charge).await
    }

    #[instrument(skip(self, email))]
    async fn create_customer(&self, email: Option<&str>) -> PaymentResult<Customer> {
        self.create_customer_record(email).await
    }

    #[instrument(skip(self, params), fields(customer_id = %params.customer_id))]
    async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> PaymentResult<CheckoutSession> {
        self.create_session(params).await
    }

    fn verifies_webhooks(&self) -> bool {
        self.config.webhook_secret.is_some()
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent> {
        let secret = self.config.webhook_secret.as_deref().ok_or_else(|| {
            PaymentError::Configuration("STRIPE_WEBHOOK_SECRET not set".to_string())
        })?;
        webhook::construct_event(payload, signature, secret)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
