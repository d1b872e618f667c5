//! # Payment Error Types
//!
//! Typed error handling for the offsession-pay backend.
//! All provider operations return `Result<T, PaymentError>`.

use crate::charge::CardError;
use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Customer has no stored card to charge
    #[error("No stored card for customer: {customer_id}")]
    NoPaymentMethod { customer_id: String },

    /// Card was declined or needs authentication
    #[error("Card declined: {0}")]
    CardDeclined(Box<CardError>),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider did not answer within the configured timeout
    #[error("Provider request timed out after {0} seconds")]
    Timeout(u64),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::NoPaymentMethod { .. } => 400,
            PaymentError::CardDeclined(_) => 402,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Timeout(_) => 504,
            PaymentError::WebhookVerificationFailed(_) => 403,
            PaymentError::WebhookParseError(_) => 400,
            PaymentError::Internal(_) => 500,
            PaymentError::Serialization(_) => 500,
        }
    }
}

impl From<CardError> for PaymentError {
    fn from(err: CardError) -> Self {
        PaymentError::CardDeclined(Box::new(err))
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
