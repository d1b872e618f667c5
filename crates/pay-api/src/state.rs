//! # Application State
//!
//! Shared state for the Axum application.
//! Configuration is read once at startup; handlers receive it through
//! `State` rather than reading the environment per request.

use pay_core::{BoxedPaymentProvider, CheckoutUrls, Currency, PaymentError, PaymentResult, Price};
use pay_stripe::{LoggingWebhookHandler, StripeClient, StripeConfig, WebhookHandler};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL used for checkout redirects
    pub domain: String,
    /// Directory holding index.html and the redirect pages
    pub static_dir: PathBuf,
    /// Price charged off-session and advertised by /config
    pub price: Price,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> PaymentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| PaymentError::Configuration(format!("{} not set", key)))
        };

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                PaymentError::Configuration(format!("PORT must be a port number, got {:?}", raw))
            })?,
            None => 4242,
        };

        let amount = match var("UNIT_AMOUNT") {
            Some(raw) => raw.trim().parse::<i64>().ok().filter(|a| *a > 0).ok_or_else(|| {
                PaymentError::Configuration(format!(
                    "UNIT_AMOUNT must be a positive integer, got {:?}",
                    raw
                ))
            })?,
            None => Price::default().amount,
        };

        let currency = match var("CURRENCY") {
            Some(raw) => raw.parse::<Currency>()?,
            None => Price::default().currency,
        };

        let domain = required("DOMAIN")?.trim_end_matches('/').to_string();
        if !domain.starts_with("http://") && !domain.starts_with("https://") {
            return Err(PaymentError::Configuration(
                "DOMAIN must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            domain,
            static_dir: PathBuf::from(required("STATIC_DIR")?),
            price: Price::from_cents(amount, currency),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> PaymentResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PaymentError::Configuration(format!("Invalid socket address: {}", e)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider all handlers talk to
    pub provider: BoxedPaymentProvider,
    /// Receives decoded webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Checkout redirect URLs
    pub urls: CheckoutUrls,
    /// Publishable key handed to the browser
    pub publishable_key: String,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState backed by Stripe, from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let stripe_config = StripeConfig::from_env()?;
        Ok(Self::with_stripe(config, stripe_config)?)
    }

    /// Build state around a Stripe client
    pub fn with_stripe(config: AppConfig, stripe_config: StripeConfig) -> PaymentResult<Self> {
        let publishable_key = stripe_config.publishable_key.clone();
        let stripe = StripeClient::new(stripe_config)?;
        Ok(Self::with_provider(config, Arc::new(stripe), publishable_key))
    }

    /// Build state around any provider
    pub fn with_provider(
        config: AppConfig,
        provider: BoxedPaymentProvider,
        publishable_key: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            urls: CheckoutUrls::new(&config.domain),
            publishable_key: publishable_key.into(),
            config: Arc::new(config),
        }
    }

    /// Builder: replace the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }
}
