//! # offsession-pay
//!
//! Card-saving checkout and off-session charging backend.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...   # optional, see below
//! export STATIC_DIR=../client
//! export DOMAIN=http://localhost:4242
//!
//! # Run the server
//! offsession-pay
//! ```
//!
//! Without `STRIPE_WEBHOOK_SECRET` webhook bodies are trusted as-is. That is
//! for local development only.

use pay_api::{routes, state::AppState};
use pay_stripe::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Print banner
    print_banner();

    // Initialize application state; bad config stops us here
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.provider.provider_name());
    info!("Static files: {}", state.config.static_dir.display());
    info!("Price: {}", state.config.price.display());

    if state.provider.verifies_webhooks() {
        info!("Webhook events handled: {:?}", REQUIRED_WEBHOOK_EVENTS);
    } else {
        warn!("STRIPE_WEBHOOK_SECRET not set: webhook signatures are NOT verified (development only)");
    }

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🚀 offsession-pay starting on http://{}", addr);

    if !is_prod {
        info!("💳 Checkout: POST http://{}/create-checkout-session", addr);
        info!("🔔 Webhook: POST http://{}/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let (text_layer, json_layer) = if json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn print_banner() {
    println!(
        r#"
  💳 offsession-pay 💳
  ━━━━━━━━━━━━━━━━━━━━━━━
  Save a card, charge it later
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
