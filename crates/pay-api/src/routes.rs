//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
///   - GET  / - index.html from the static directory
///   - GET  /health - Health check
///   - GET  /config - Publishable key and price
///   - GET  /charge-card-off-session?customerId= - Charge a saved card
///   - POST /create-checkout-session - Setup-mode checkout session
///   - POST /webhook - Provider webhook (raw body)
///
/// Anything else is looked up in the static directory
/// (`success.html`, `canceled.html`, assets).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::public_config))
        .route(
            "/charge-card-off-session",
            get(handlers::charge_card_off_session),
        )
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/webhook", post(handlers::webhook))
        .fallback_service(static_files)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
