//! # Payment Provider Trait
//!
//! The seam between the HTTP layer and a hosted payments API. Handlers only
//! ever talk to `dyn PaymentProvider`, which keeps them testable against an
//! in-memory fake.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PaymentProvider (trait)                    │
//! │  ├── list_card_payment_methods()                            │
//! │  ├── charge_off_session()                                   │
//! │  ├── create_customer()                                      │
//! │  ├── create_checkout_session()                              │
//! │  ├── verify_webhook() / parse_webhook()                     │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::charge::{Customer, OffSessionCharge, PaymentIntent, PaymentMethod};
use crate::checkout::{CheckoutSession, NewCheckoutSession};
use crate::error::PaymentResult;
use crate::event::WebhookEvent;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// List the customer's stored card payment methods, newest first.
    async fn list_card_payment_methods(&self, customer_id: &str)
        -> PaymentResult<Vec<PaymentMethod>>;

    /// Create and confirm a payment intent without the cardholder present.
    ///
    /// Card declines (including `authentication_required`) come back as
    /// `PaymentError::CardDeclined`.
    async fn charge_off_session(&self, charge: &OffSessionCharge) -> PaymentResult<PaymentIntent>;

    /// Create a customer record, optionally with an email address.
    async fn create_customer(&self, email: Option<&str>) -> PaymentResult<Customer>;

    /// Create a hosted checkout session.
    async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> PaymentResult<CheckoutSession>;

    /// Whether a webhook signing secret is configured.
    fn verifies_webhooks(&self) -> bool;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent>;

    /// Parse a webhook body without verification. Development only.
    fn parse_webhook(&self, payload: &[u8]) -> PaymentResult<WebhookEvent> {
        WebhookEvent::from_slice(payload)
    }

    /// Get the provider name (for logging and error messages).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment provider (dynamic dispatch)
pub type BoxedPaymentProvider = Arc<dyn PaymentProvider>;
