//! # Stripe Webhook Handling
//!
//! Signature verification for the `Stripe-Signature` header and dispatch of
//! decoded events to a [`WebhookHandler`].
//!
//! The header has the form `t=<unix ts>,v1=<hex>,v1=<hex>,...`. Each `v1`
//! value is an HMAC-SHA256 of `"<t>.<raw body>"` keyed with the endpoint's
//! signing secret; any one match is enough.

use chrono::Utc;
use hmac::{Hmac, Mac};
use pay_core::{
    CheckoutSessionObject, PaymentError, PaymentIntent, PaymentResult, SetupIntentObject,
    WebhookEvent, WebhookEventKind,
};
use sha2::Sha256;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Events this backend reacts to; enable them on the webhook endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "checkout.session.expired",
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
    "setup_intent.succeeded",
];

// =============================================================================
// Signature Verification
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(PaymentError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Internal(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verify `header` against `payload` as of `now` (unix seconds).
pub fn verify_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> PaymentResult<()> {
    let parsed = parse_signature_header(header)?;

    if (now - parsed.timestamp).abs() > tolerance_secs {
        return Err(PaymentError::WebhookVerificationFailed(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let mac = signed_mac(secret, parsed.timestamp, payload)?;

    // verify_slice compares in constant time
    let valid = parsed.signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if !valid {
        return Err(PaymentError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }

    Ok(())
}

/// Verify the signature and decode the event
pub fn construct_event(payload: &[u8], header: &str, secret: &str) -> PaymentResult<WebhookEvent> {
    verify_signature_at(
        payload,
        header,
        secret,
        Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )?;

    let event = WebhookEvent::from_slice(payload)?;
    debug!("Verified Stripe webhook: type={}, id={}", event.event_type(), event.id);
    Ok(event)
}

/// Build a valid `Stripe-Signature` header for `payload`.
///
/// Meant for tests and local tooling that replay events.
pub fn generate_test_header(payload: &[u8], secret: &str, timestamp: i64) -> PaymentResult<String> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Webhook event handler trait
///
/// Implement this trait to react to different webhook events. Every method
/// defaults to logging.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed (card saved)
    fn on_checkout_completed(&self, session: &CheckoutSessionObject) -> PaymentResult<()> {
        info!(
            "🔔 Payment succeeded! session={}, customer={:?}",
            session.id, session.customer
        );
        Ok(())
    }

    /// Called when a checkout session expires unused
    fn on_checkout_expired(&self, session: &CheckoutSessionObject) -> PaymentResult<()> {
        info!("Checkout session expired: {}", session.id);
        Ok(())
    }

    /// Called when a payment succeeds
    fn on_payment_succeeded(&self, intent: &PaymentIntent) -> PaymentResult<()> {
        info!("Payment intent succeeded: {} ({})", intent.id, intent.amount);
        Ok(())
    }

    /// Called when a payment fails
    fn on_payment_failed(&self, intent: &PaymentIntent) -> PaymentResult<()> {
        warn!("Payment intent failed: {}", intent.id);
        Ok(())
    }

    /// Called when a card is saved through a setup intent
    fn on_setup_succeeded(&self, intent: &SetupIntentObject) -> PaymentResult<()> {
        info!(
            "Setup intent succeeded: {} (payment_method={:?})",
            intent.id, intent.payment_method
        );
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!("Unhandled webhook event: {}", event.event_type());
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> PaymentResult<()> {
    match &event.kind {
        WebhookEventKind::CheckoutSessionCompleted(session) => {
            handler.on_checkout_completed(session)
        }
        WebhookEventKind::CheckoutSessionExpired(session) => handler.on_checkout_expired(session),
        WebhookEventKind::PaymentIntentSucceeded(intent) => handler.on_payment_succeeded(intent),
        WebhookEventKind::PaymentIntentFailed(intent) => handler.on_payment_failed(intent),
        WebhookEventKind::SetupIntentSucceeded(intent) => handler.on_setup_succeeded(intent),
        WebhookEventKind::Unknown { .. } => handler.on_unknown_event(event),
    }
}
