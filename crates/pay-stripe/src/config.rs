//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables.

use pay_core::PaymentError;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
pub const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_..., sk_live_... or restricted rk_...)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...)
    pub publishable_key: String,

    /// Webhook signing secret (whsec_...). Without it webhooks are
    /// accepted unverified, which is only acceptable in development.
    pub webhook_secret: Option<String>,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// Upper bound on each API call
    pub timeout: Duration,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    ///
    /// Optional:
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `STRIPE_API_BASE`
    /// - `STRIPE_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PaymentError::Configuration(format!("{} not set", key)))
        };

        let secret_key = required("STRIPE_SECRET_KEY")?;
        let publishable_key = required("STRIPE_PUBLISHABLE_KEY")?;
        let webhook_secret = lookup("STRIPE_WEBHOOK_SECRET").filter(|v| !v.trim().is_empty());

        // Validate key formats
        if !secret_key.starts_with("sk_test_")
            && !secret_key.starts_with("sk_live_")
            && !secret_key.starts_with("rk_")
        {
            return Err(PaymentError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_, sk_live_ or rk_".to_string(),
            ));
        }

        if !publishable_key.starts_with("pk_test_") && !publishable_key.starts_with("pk_live_") {
            return Err(PaymentError::Configuration(
                "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        if let Some(ref secret) = webhook_secret {
            if !secret.starts_with("whsec_") {
                return Err(PaymentError::Configuration(
                    "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
                ));
            }
        }

        let timeout_secs = match lookup("STRIPE_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                PaymentError::Configuration(format!(
                    "STRIPE_TIMEOUT_SECS must be a positive integer, got {:?}",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::new(secret_key, publishable_key, webhook_secret)
            .with_timeout(Duration::from_secs(timeout_secs));

        if let Some(base) = lookup("STRIPE_API_BASE").filter(|v| !v.trim().is_empty()) {
            config = config.with_api_base_url(base);
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        secret_key: impl Into<String>,
        publishable_key: impl Into<String>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            webhook_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_") || self.secret_key.starts_with("rk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Builder: set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keys stay out of logs.
impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("publishable_key", &self.publishable_key)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_validation() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_secret"),
        ]))
        .unwrap();
        assert!(config.is_test_mode());
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_secret"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_live_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_live_xyz789"),
        ]))
        .unwrap();
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_webhook_secret_is_optional() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_WEBHOOK_SECRET", ""),
        ]))
        .unwrap();
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let bad_secret = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "pk_test_wrong"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
        ]));
        assert!(bad_secret.is_err());

        let bad_webhook = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_WEBHOOK_SECRET", "secret"),
        ]));
        assert!(bad_webhook.is_err());

        let bad_timeout = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_TIMEOUT_SECS", "0"),
        ]));
        assert!(bad_timeout.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_API_BASE", "http://127.0.0.1:12111/"),
            ("STRIPE_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:12111");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_missing_key() {
        let result = StripeConfig::from_lookup(lookup(&[("STRIPE_PUBLISHABLE_KEY", "pk_test_x")]));
        match result {
            Err(PaymentError::Configuration(msg)) => assert!(msg.contains("STRIPE_SECRET_KEY")),
            other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_auth_header_and_debug_redaction() {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789", Some("whsec_s".into()));
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");

        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk_test_abc123"));
        assert!(!printed.contains("whsec_s"));
    }
}
