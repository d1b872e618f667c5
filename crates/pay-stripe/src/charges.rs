//! # Off-Session Charges
//!
//! Payment method listing and confirmed, off-session payment intents.

use crate::client::{StripeClient, PROVIDER};
use pay_core::{OffSessionCharge, PaymentError, PaymentIntent, PaymentMethod, PaymentResult};
use serde::Deserialize;
use tracing::info;

/// Stripe list envelope
#[derive(Debug, Deserialize)]
pub(crate) struct StripeList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

impl StripeClient {
    /// List a customer's payment methods of the given type
    pub async fn list_payment_methods(
        &self,
        customer_id: &str,
        method_type: &str,
    ) -> PaymentResult<Vec<PaymentMethod>> {
        if customer_id.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "customer id is required".to_string(),
            ));
        }

        let list: StripeList<PaymentMethod> = self
            .get(
                "/v1/payment_methods",
                &[("customer", customer_id), ("type", method_type)],
            )
            .await?;

        info!(
            "Found {} {} payment method(s) for {} (has_more={})",
            list.data.len(),
            method_type,
            customer_id,
            list.has_more
        );

        Ok(list.data)
    }

    /// Create and confirm a payment intent with the cardholder absent
    pub async fn create_off_session_intent(
        &self,
        charge: &OffSessionCharge,
    ) -> PaymentResult<PaymentIntent> {
        let form = off_session_form(charge);
        let intent: PaymentIntent = self.post_form("/v1/payment_intents", &form).await?;

        if intent.client_secret.as_deref().unwrap_or_default().is_empty() {
            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("payment intent {} has no client secret", intent.id),
            });
        }

        info!(
            "Created off-session payment intent: id={}, status={:?}, amount={}",
            intent.id,
            intent.status,
            charge.price.display()
        );

        Ok(intent)
    }
}

fn off_session_form(charge: &OffSessionCharge) -> Vec<(String, String)> {
    vec![
        ("amount".to_string(), charge.price.amount.to_string()),
        ("currency".to_string(), charge.price.currency.as_str().to_string()),
        ("payment_method".to_string(), charge.payment_method_id.clone()),
        ("customer".to_string(), charge.customer_id.clone()),
        ("confirm".to_string(), "true".to_string()),
        ("off_session".to_string(), "true".to_string()),
    ]
}
