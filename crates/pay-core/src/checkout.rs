//! # Checkout Types
//!
//! Checkout session types and the redirect URLs handed to the provider.

use serde::{Deserialize, Serialize};

/// Checkout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// One-time payment
    Payment,
    /// Subscription
    Subscription,
    /// Setup (save card for later)
    Setup,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
            CheckoutMode::Setup => "setup",
        }
    }
}

impl Default for CheckoutMode {
    fn default() -> Self {
        CheckoutMode::Setup
    }
}

/// Parameters for a new hosted checkout session
#[derive(Debug, Clone)]
pub struct NewCheckoutSession {
    pub mode: CheckoutMode,
    pub customer_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub payment_method_types: Vec<String>,
}

impl NewCheckoutSession {
    /// Card-saving session for an existing customer
    pub fn setup_card(customer_id: impl Into<String>, urls: &CheckoutUrls) -> Self {
        let customer_id = customer_id.into();
        Self {
            mode: CheckoutMode::Setup,
            success_url: urls.success_url(&customer_id),
            cancel_url: urls.cancel_url(),
            customer_id,
            payment_method_types: vec!["card".to_string()],
        }
    }
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub id: String,

    /// Hosted page URL (absent for some API versions/modes)
    #[serde(default)]
    pub url: Option<String>,

    /// Customer the session is attached to
    #[serde(default)]
    pub customer: Option<String>,

    pub mode: CheckoutMode,
}

/// Redirect URLs used in checkout, rooted at the public domain
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the application (e.g., "https://example.com")
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            success_path: "/success.html".to_string(),
            cancel_path: "/canceled.html".to_string(),
        }
    }

    /// Success page carrying the customer id, so the page can trigger the
    /// off-session charge afterwards
    pub fn success_url(&self, customer_id: &str) -> String {
        format!(
            "{}{}?customerId={}",
            self.base_url, self.success_path, customer_id
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::new("https://example.com");

        assert_eq!(
            urls.success_url("cus_123"),
            "https://example.com/success.html?customerId=cus_123"
        );
        assert_eq!(urls.cancel_url(), "https://example.com/canceled.html");
    }

    #[test]
    fn test_checkout_urls_trailing_slash() {
        let urls = CheckoutUrls::new("http://localhost:4242/");
        assert_eq!(urls.cancel_url(), "http://localhost:4242/canceled.html");
    }

    #[test]
    fn test_setup_card_session() {
        let urls = CheckoutUrls::new("https://example.com");
        let params = NewCheckoutSession::setup_card("cus_9", &urls);

        assert_eq!(params.mode, CheckoutMode::Setup);
        assert_eq!(params.mode.as_str(), "setup");
        assert_eq!(params.customer_id, "cus_9");
        assert_eq!(params.payment_method_types, vec!["card".to_string()]);
        assert!(params.success_url.ends_with("?customerId=cus_9"));
    }
}
