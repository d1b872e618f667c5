//! # Off-Session Charges
//!
//! Customer, payment method and payment intent records as returned by the
//! provider, plus the outcome taxonomy for charging a stored card while the
//! cardholder is away.

use crate::money::Price;
use serde::{Deserialize, Serialize};

/// A provider-side customer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Card details attached to a stored payment method.
///
/// Fields the backend does not read are kept in `extra` so the whole card
/// object reaches the browser client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub last4: String,
    #[serde(default)]
    pub exp_month: u32,
    #[serde(default)]
    pub exp_year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A stored payment method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(default)]
    pub card: Option<Card>,
    #[serde(default)]
    pub customer: Option<String>,
}

/// Lifecycle status of a payment intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

/// A single attempted charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: PaymentIntentStatus,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub customer: Option<String>,
}

/// Parameters for charging a stored card off-session.
///
/// Always confirmed immediately; the provider either succeeds or raises a
/// card error.
#[derive(Debug, Clone)]
pub struct OffSessionCharge {
    pub customer_id: String,
    pub payment_method_id: String,
    pub price: Price,
}

/// Card-level failure reported by the provider.
///
/// `payment_intent` is present when the provider created an intent before
/// the decline, which is what lets the client resume the purchase on-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_intent: Option<PaymentIntent>,
}

impl CardError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            decline_code: None,
            message: message.into(),
            payment_method: None,
            payment_intent: None,
        }
    }

    pub fn with_payment_intent(mut self, intent: PaymentIntent) -> Self {
        self.payment_intent = Some(intent);
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    fn client_secret(&self) -> Option<&str> {
        self.payment_intent
            .as_ref()
            .and_then(|pi| pi.client_secret.as_deref())
    }
}

impl std::fmt::Display for CardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Result of an off-session charge attempt that the caller can act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// The charge went through
    Succeeded { client_secret: String },
    /// The bank wants the cardholder to authenticate (3-D Secure).
    /// The client brings the customer back on-session with these details.
    AuthenticationRequired {
        card: Option<Card>,
        payment_method: String,
        client_secret: String,
    },
    /// Declined for another reason (e.g. insufficient funds)
    Declined { code: String, client_secret: String },
}

pub const AUTHENTICATION_REQUIRED: &str = "authentication_required";

impl ChargeOutcome {
    /// Classify a card error raised while charging `charged`.
    ///
    /// Returns `None` when the error carries no code or no payment intent;
    /// the caller has nothing to resume in that case.
    pub fn from_card_error(err: &CardError, charged: &PaymentMethod) -> Option<Self> {
        let code = err.code.as_deref()?;
        let client_secret = err.client_secret()?.to_string();

        if code == AUTHENTICATION_REQUIRED {
            let method = err.payment_method.as_ref().unwrap_or(charged);
            return Some(ChargeOutcome::AuthenticationRequired {
                card: method.card.clone(),
                payment_method: method.id.clone(),
                client_secret,
            });
        }

        Some(ChargeOutcome::Declined {
            code: code.to_string(),
            client_secret,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChargeOutcome::Succeeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card_method(id: &str) -> PaymentMethod {
        PaymentMethod {
            id: id.to_string(),
            method_type: "card".to_string(),
            card: Some(Card {
                brand: "visa".to_string(),
                last4: "3155".to_string(),
                exp_month: 12,
                exp_year: 2030,
                country: Some("US".to_string()),
                funding: Some("credit".to_string()),
                extra: Default::default(),
            }),
            customer: Some("cus_123".to_string()),
        }
    }

    fn intent(secret: &str) -> PaymentIntent {
        PaymentIntent {
            id: "pi_123".to_string(),
            client_secret: Some(secret.to_string()),
            status: PaymentIntentStatus::RequiresPaymentMethod,
            amount: 2900,
            currency: "eur".to_string(),
            customer: Some("cus_123".to_string()),
        }
    }

    #[test]
    fn test_authentication_required_outcome() {
        let charged = card_method("pm_charged");
        let err = CardError::new(AUTHENTICATION_REQUIRED, "Authentication required")
            .with_payment_method(card_method("pm_from_error"))
            .with_payment_intent(intent("pi_123_secret_abc"));

        let outcome = ChargeOutcome::from_card_error(&err, &charged).unwrap();
        match outcome {
            ChargeOutcome::AuthenticationRequired {
                card,
                payment_method,
                client_secret,
            } => {
                assert_eq!(payment_method, "pm_from_error");
                assert_eq!(client_secret, "pi_123_secret_abc");
                assert_eq!(card.unwrap().last4, "3155");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_authentication_required_falls_back_to_charged_method() {
        let charged = card_method("pm_charged");
        let err = CardError::new(AUTHENTICATION_REQUIRED, "Authentication required")
            .with_payment_intent(intent("secret"));

        let outcome = ChargeOutcome::from_card_error(&err, &charged).unwrap();
        assert!(matches!(
            outcome,
            ChargeOutcome::AuthenticationRequired { ref payment_method, .. } if payment_method == "pm_charged"
        ));
    }

    #[test]
    fn test_other_decline_outcome() {
        let charged = card_method("pm_charged");
        let err = CardError::new("card_declined", "Your card has insufficient funds.")
            .with_payment_intent(intent("secret"));

        let outcome = ChargeOutcome::from_card_error(&err, &charged).unwrap();
        assert_eq!(
            outcome,
            ChargeOutcome::Declined {
                code: "card_declined".to_string(),
                client_secret: "secret".to_string(),
            }
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_decline_without_intent_is_unclassified() {
        let charged = card_method("pm_charged");
        let err = CardError::new("card_declined", "declined");
        assert!(ChargeOutcome::from_card_error(&err, &charged).is_none());

        let no_code = CardError {
            code: None,
            ..CardError::new("x", "y").with_payment_intent(intent("secret"))
        };
        assert!(ChargeOutcome::from_card_error(&no_code, &charged).is_none());
    }

    #[test]
    fn test_card_error_deserializes_provider_shape() {
        let raw = json!({
            "type": "card_error",
            "code": "authentication_required",
            "decline_code": "authentication_required",
            "message": "This payment requires authentication.",
            "payment_method": {
                "id": "pm_1",
                "type": "card",
                "card": { "brand": "visa", "last4": "3184", "exp_month": 1, "exp_year": 2031 }
            },
            "payment_intent": {
                "id": "pi_1",
                "client_secret": "pi_1_secret_x",
                "status": "requires_payment_method",
                "amount": 2900,
                "currency": "eur"
            }
        });

        let err: CardError = serde_json::from_value(raw).unwrap();
        assert_eq!(err.code.as_deref(), Some("authentication_required"));
        assert_eq!(err.client_secret(), Some("pi_1_secret_x"));
        assert_eq!(err.payment_method.unwrap().card.unwrap().last4, "3184");
    }

    #[test]
    fn test_card_keeps_unread_fields() {
        let raw = json!({
            "brand": "visa",
            "last4": "3184",
            "exp_month": 1,
            "exp_year": 2031,
            "fingerprint": "Xt5EWLLDS7FJjR1c",
            "checks": { "cvc_check": "pass" }
        });

        let card: Card = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(card.extra["fingerprint"], "Xt5EWLLDS7FJjR1c");
        assert_eq!(serde_json::to_value(&card).unwrap(), raw);

        // Sparse card objects still decode
        let sparse: Card = serde_json::from_value(json!({ "last4": "0000" })).unwrap();
        assert_eq!(sparse.last4, "0000");
        assert_eq!(sparse.exp_year, 0);
    }

    #[test]
    fn test_unknown_intent_status() {
        let status: PaymentIntentStatus = serde_json::from_value(json!("some_new_status")).unwrap();
        assert_eq!(status, PaymentIntentStatus::Unknown);
    }
}
