//! # Webhook Events
//!
//! Provider events decoded into a closed set of kinds this backend reacts
//! to. Anything else lands in [`WebhookEventKind::Unknown`] with its raw
//! object kept for logging.

use crate::charge::PaymentIntent;
use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";
pub const SETUP_INTENT_SUCCEEDED: &str = "setup_intent.succeeded";

/// Completed or expired checkout session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub setup_intent: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSessionObject {
    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
    }
}

/// A setup intent, created when a checkout session saves a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupIntentObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEventKind {
    CheckoutSessionCompleted(CheckoutSessionObject),
    CheckoutSessionExpired(CheckoutSessionObject),
    PaymentIntentSucceeded(PaymentIntent),
    PaymentIntentFailed(PaymentIntent),
    SetupIntentSucceeded(SetupIntentObject),
    Unknown {
        event_type: String,
        object: serde_json::Value,
    },
}

/// A decoded webhook event
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    /// Event ID from provider (evt_...)
    pub id: String,
    /// Unix timestamp of creation
    pub created: i64,
    pub livemode: bool,
    pub kind: WebhookEventKind,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    #[serde(default)]
    livemode: bool,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

/// Decode a known event's object, or keep it raw when its shape is unexpected
fn typed_or_unknown<T, F>(event_type: String, object: serde_json::Value, wrap: F) -> WebhookEventKind
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(T) -> WebhookEventKind,
{
    match serde_json::from_value::<T>(object.clone()) {
        Ok(typed) => wrap(typed),
        Err(e) => {
            warn!("Unexpected {} object, treating as unknown: {}", event_type, e);
            WebhookEventKind::Unknown { event_type, object }
        }
    }
}

impl WebhookEvent {
    /// Decode an event from its JSON payload
    pub fn from_slice(payload: &[u8]) -> PaymentResult<Self> {
        let raw: RawEvent = serde_json::from_slice(payload).map_err(|e| {
            PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
        })?;

        let object = raw.data.object;
        let kind = match raw.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => typed_or_unknown(
                raw.event_type,
                object,
                WebhookEventKind::CheckoutSessionCompleted,
            ),
            CHECKOUT_SESSION_EXPIRED => typed_or_unknown(
                raw.event_type,
                object,
                WebhookEventKind::CheckoutSessionExpired,
            ),
            PAYMENT_INTENT_SUCCEEDED => typed_or_unknown(
                raw.event_type,
                object,
                WebhookEventKind::PaymentIntentSucceeded,
            ),
            PAYMENT_INTENT_FAILED => {
                typed_or_unknown(raw.event_type, object, WebhookEventKind::PaymentIntentFailed)
            }
            SETUP_INTENT_SUCCEEDED => {
                typed_or_unknown(raw.event_type, object, WebhookEventKind::SetupIntentSucceeded)
            }
            _ => WebhookEventKind::Unknown {
                event_type: raw.event_type,
                object,
            },
        };

        Ok(Self {
            id: raw.id,
            created: raw.created,
            livemode: raw.livemode,
            kind,
        })
    }

    /// Provider's event type string
    pub fn event_type(&self) -> &str {
        match &self.kind {
            WebhookEventKind::CheckoutSessionCompleted(_) => CHECKOUT_SESSION_COMPLETED,
            WebhookEventKind::CheckoutSessionExpired(_) => CHECKOUT_SESSION_EXPIRED,
            WebhookEventKind::PaymentIntentSucceeded(_) => PAYMENT_INTENT_SUCCEEDED,
            WebhookEventKind::PaymentIntentFailed(_) => PAYMENT_INTENT_FAILED,
            WebhookEventKind::SetupIntentSucceeded(_) => SETUP_INTENT_SUCCEEDED,
            WebhookEventKind::Unknown { event_type, .. } => event_type,
        }
    }
}
