//! # pay-core
//!
//! Core types and traits for the offsession-pay backend.
//!
//! This crate provides:
//! - `PaymentProvider` trait for implementing payment providers
//! - `Currency` and `Price` for the single plan on sale
//! - `PaymentMethod`, `PaymentIntent` and `ChargeOutcome` for off-session charging
//! - `NewCheckoutSession`, `CheckoutSession` and `CheckoutUrls` for card setup
//! - `WebhookEvent` / `WebhookEventKind` for provider callbacks
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{CheckoutUrls, NewCheckoutSession, PaymentProvider};
//!
//! let urls = CheckoutUrls::new("https://example.com");
//! let customer = provider.create_customer(None).await?;
//! let session = provider
//!     .create_checkout_session(&NewCheckoutSession::setup_card(&customer.id, &urls))
//!     .await?;
//! ```

pub mod charge;
pub mod checkout;
pub mod error;
pub mod event;
pub mod money;
pub mod provider;

// Re-exports for convenience
pub use charge::{
    Card, CardError, ChargeOutcome, Customer, OffSessionCharge, PaymentIntent,
    PaymentIntentStatus, PaymentMethod,
};
pub use checkout::{CheckoutMode, CheckoutSession, CheckoutUrls, NewCheckoutSession};
pub use error::{PaymentError, PaymentResult};
pub use event::{CheckoutSessionObject, SetupIntentObject, WebhookEvent, WebhookEventKind};
pub use money::{Currency, Price};
pub use provider::{BoxedPaymentProvider, PaymentProvider};
