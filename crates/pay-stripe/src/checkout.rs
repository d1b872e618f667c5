//! # Stripe Checkout Sessions
//!
//! Customer creation and hosted Checkout Sessions. Sessions are created in
//! `setup` mode: the customer saves a card, which later funds off-session
//! charges.

use crate::client::StripeClient;
use pay_core::{CheckoutSession, Customer, NewCheckoutSession, PaymentResult};
use tracing::info;

impl StripeClient {
    /// Create a customer record
    pub async fn create_customer_record(&self, email: Option<&str>) -> PaymentResult<Customer> {
        let mut form: Vec<(String, String)> = Vec::new();
        if let Some(email) = email {
            form.push(("email".to_string(), email.to_string()));
        }

        let customer: Customer = self.post_form("/v1/customers", &form).await?;
        info!("Created Stripe customer: id={}", customer.id);
        Ok(customer)
    }

    /// Create a hosted checkout session
    pub async fn create_session(
        &self,
        params: &NewCheckoutSession,
    ) -> PaymentResult<CheckoutSession> {
        let form = session_form(params);
        let session: CheckoutSession = self.post_form("/v1/checkout/sessions", &form).await?;

        info!(
            "Created Stripe checkout session: id={}, mode={}, customer={}",
            session.id,
            session.mode.as_str(),
            params.customer_id
        );

        Ok(session)
    }
}

fn session_form(params: &NewCheckoutSession) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".to_string(), params.mode.as_str().to_string()),
        ("customer".to_string(), params.customer_id.clone()),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
    ];

    for (i, method) in params.payment_method_types.iter().enumerate() {
        form.push((format!("payment_method_types[{}]", i), method.clone()));
    }

    form
}
