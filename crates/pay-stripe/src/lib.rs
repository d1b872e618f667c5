//! # pay-stripe
//!
//! Stripe payment provider for offsession-pay.
//!
//! [`StripeClient`] implements `pay_core::PaymentProvider` over Stripe's REST
//! API:
//!
//! 1. **Off-session charges** - list a customer's saved cards and confirm a
//!    payment intent without the cardholder present
//! 2. **Checkout Sessions** - create a customer and a hosted `setup`-mode
//!    session to save a card
//! 3. **Webhooks** - verify `Stripe-Signature` headers and decode events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_stripe::StripeClient;
//! use pay_core::{OffSessionCharge, PaymentProvider, Price};
//!
//! let stripe = StripeClient::from_env()?;
//! let cards = stripe.list_card_payment_methods("cus_123").await?;
//! let intent = stripe
//!     .charge_off_session(&OffSessionCharge {
//!         customer_id: "cus_123".into(),
//!         payment_method_id: cards[0].id.clone(),
//!         price: Price::default(),
//!     })
//!     .await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use pay_stripe::{dispatch_webhook_event, LoggingWebhookHandler};
//!
//! let event = stripe.verify_webhook(payload, signature)?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! ```

pub mod charges;
pub mod checkout;
pub mod client;
pub mod config;
pub mod webhook;

// Re-exports
pub use client::StripeClient;
pub use config::StripeConfig;
pub use webhook::{
    construct_event, dispatch_webhook_event, generate_test_header, LoggingWebhookHandler,
    WebhookHandler, REQUIRED_WEBHOOK_EVENTS,
};
