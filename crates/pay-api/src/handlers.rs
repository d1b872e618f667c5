//! # Request Handlers
//!
//! Axum request handlers for the payment API. Each handler assembles
//! provider parameters, calls the provider, and reshapes the result into the
//! JSON the browser client expects.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use pay_core::{
    Card, ChargeOutcome, NewCheckoutSession, OffSessionCharge, PaymentError,
};
use pay_stripe::dispatch_webhook_event;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Public configuration for the browser client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigResponse {
    pub public_key: String,
    pub unit_amount: i64,
    pub currency: String,
}

/// Query string of the off-session charge route
#[derive(Debug, Deserialize)]
pub struct ChargeQuery {
    #[serde(rename = "customerId", default)]
    pub customer_id: Option<String>,
}

/// Off-session charge result, in one of three shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChargeResponse {
    Succeeded {
        succeeded: bool,
        #[serde(rename = "clientSecret")]
        client_secret: String,
    },
    AuthenticationRequired {
        error: String,
        card: Option<Card>,
        #[serde(rename = "paymentMethod")]
        payment_method: String,
        #[serde(rename = "clientSecret")]
        client_secret: String,
    },
    Declined {
        error: String,
        #[serde(rename = "clientSecret")]
        client_secret: String,
    },
}

impl From<ChargeOutcome> for ChargeResponse {
    fn from(outcome: ChargeOutcome) -> Self {
        match outcome {
            ChargeOutcome::Succeeded { client_secret } => ChargeResponse::Succeeded {
                succeeded: true,
                client_secret,
            },
            ChargeOutcome::AuthenticationRequired {
                card,
                payment_method,
                client_secret,
            } => ChargeResponse::AuthenticationRequired {
                error: pay_core::charge::AUTHENTICATION_REQUIRED.to_string(),
                card,
                payment_method,
                client_secret,
            },
            ChargeOutcome::Declined {
                code,
                client_secret,
            } => ChargeResponse::Declined {
                error: code,
                client_secret,
            },
        }
    }
}

/// Create checkout request
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Accepted for client compatibility; a setup session has no line items
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Customer email (optional)
    #[serde(default)]
    pub email: Option<String>,
}

/// Create checkout response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    pub session_id: String,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let PaymentError::CardDeclined(card) = &err {
        if let Some(code) = card.decline_code.as_ref().or(card.code.as_ref()) {
            response = response.with_details(code.clone());
        }
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message, status.as_u16())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "offsession-pay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Serve index.html from the static directory
pub async fn index(State(state): State<AppState>) -> Result<Html<Vec<u8>>, ApiError> {
    let path = state.config.static_dir.join("index.html");

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Html(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("index.html not found at {}", path.display());
            Err(error_response(StatusCode::NOT_FOUND, "index.html not found"))
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to read index.html",
            ))
        }
    }
}

/// Publishable key and price for the browser client
pub async fn public_config(State(state): State<AppState>) -> Json<PublicConfigResponse> {
    Json(PublicConfigResponse {
        public_key: state.publishable_key.clone(),
        unit_amount: state.config.price.amount,
        currency: state.config.price.currency.to_string(),
    })
}

/// Charge the customer's first saved card without them present
#[instrument(skip(state, query))]
pub async fn charge_card_off_session(
    State(state): State<AppState>,
    Query(query): Query<ChargeQuery>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let customer_id = query
        .customer_id
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                "customerId query parameter is required",
            )
        })?;

    // List the customer's saved cards and pick one to pay with
    let methods = state
        .provider
        .list_card_payment_methods(&customer_id)
        .await
        .map_err(|e| {
            error!("Failed to list payment methods for {}: {}", customer_id, e);
            payment_error_to_response(e)
        })?;

    let method = methods.into_iter().next().ok_or_else(|| {
        warn!("Customer {} has no saved card", customer_id);
        payment_error_to_response(PaymentError::NoPaymentMethod {
            customer_id: customer_id.clone(),
        })
    })?;

    let charge = OffSessionCharge {
        customer_id: customer_id.clone(),
        payment_method_id: method.id.clone(),
        price: state.config.price,
    };

    let outcome = match state.provider.charge_off_session(&charge).await {
        Ok(intent) => {
            let client_secret = intent
                .client_secret
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    error!("Payment intent {} came back without a client secret", intent.id);
                    payment_error_to_response(PaymentError::Internal(
                        "payment intent has no client secret".to_string(),
                    ))
                })?;
            ChargeOutcome::Succeeded { client_secret }
        }
        Err(PaymentError::CardDeclined(card)) => {
            match ChargeOutcome::from_card_error(&card, &method) {
                Some(outcome) => {
                    info!("Off-session charge for {} needs the customer: {}", customer_id, card);
                    outcome
                }
                None => {
                    error!("Unclassified card error for {}: {}", customer_id, card);
                    return Err(payment_error_to_response(PaymentError::CardDeclined(card)));
                }
            }
        }
        Err(e) => {
            error!("Off-session charge for {} failed: {}", customer_id, e);
            return Err(payment_error_to_response(e));
        }
    };

    if outcome.is_success() {
        info!(
            "Charged {} off-session for {}",
            state.config.price.display(),
            customer_id
        );
    }

    Ok(Json(outcome.into()))
}

/// Create a customer and a setup-mode checkout session for them
#[instrument(skip(state, request), fields(quantity = ?request.quantity))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let customer = state.provider.create_customer(email).await.map_err(|e| {
        error!("Failed to create customer: {}", e);
        payment_error_to_response(e)
    })?;

    let params = NewCheckoutSession::setup_card(&customer.id, &state.urls);

    info!(
        "Creating checkout: customer={}, success_url={}",
        customer.id, params.success_url
    );

    let session = state
        .provider
        .create_checkout_session(&params)
        .await
        .map_err(|e| {
            error!("Failed to create checkout: {}", e);
            payment_error_to_response(e)
        })?;

    info!("Created checkout session: {}", session.id);

    Ok(Json(CreateCheckoutResponse {
        session_id: session.id,
    }))
}

/// Handle provider webhooks
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let event = if state.provider.verifies_webhooks() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        // Any failure here, including an unreadable body, is a rejection
        state
            .provider
            .verify_webhook(&body, signature)
            .map_err(|e| {
                warn!("Webhook verification failed: {}", e);
                error_response(StatusCode::FORBIDDEN, e.to_string())
            })?
    } else {
        state.provider.parse_webhook(&body).map_err(|e| {
            warn!("Unreadable webhook body: {}", e);
            payment_error_to_response(e)
        })?
    };

    info!("Received webhook: type={}, id={}", event.event_type(), event.id);

    dispatch_webhook_event(state.webhook_handler.as_ref(), &event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(WebhookAck { status: "success" }))
}
