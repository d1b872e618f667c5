#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response, StatusCode},
    Router,
};
use pay_api::{AppConfig, AppState};
use pay_core::{
    Card, CheckoutMode, CheckoutSession, Customer, NewCheckoutSession, OffSessionCharge,
    PaymentError, PaymentIntent, PaymentIntentStatus, PaymentMethod, PaymentProvider,
    PaymentResult, WebhookEvent,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const PUBLISHABLE_KEY: &str = "pk_test_public";
pub const WEBHOOK_SECRET: &str = "whsec_route_tests";

type ChargeFn = Box<dyn Fn(&OffSessionCharge) -> PaymentResult<PaymentIntent> + Send + Sync>;

/// In-memory provider recording every call
pub struct FakeProvider {
    pub methods: Vec<PaymentMethod>,
    pub charge: ChargeFn,
    pub fail_customers: bool,
    pub counter: AtomicUsize,
    pub charges: Mutex<Vec<OffSessionCharge>>,
    pub customer_emails: Mutex<Vec<Option<String>>>,
    pub sessions: Mutex<Vec<NewCheckoutSession>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            methods: vec![card_method("pm_card_visa")],
            charge: Box::new(|c| Ok(intent(&format!("{}_secret", c.payment_method_id)))),
            fail_customers: false,
            counter: AtomicUsize::new(0),
            charges: Mutex::new(Vec::new()),
            customer_emails: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_methods(mut self, methods: Vec<PaymentMethod>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_charge<F>(mut self, f: F) -> Self
    where
        F: Fn(&OffSessionCharge) -> PaymentResult<PaymentIntent> + Send + Sync + 'static,
    {
        self.charge = Box::new(f);
        self
    }

    fn next_id(&self) -> usize {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn list_card_payment_methods(
        &self,
        _customer_id: &str,
    ) -> PaymentResult<Vec<PaymentMethod>> {
        Ok(self.methods.clone())
    }

    async fn charge_off_session(&self, charge: &OffSessionCharge) -> PaymentResult<PaymentIntent> {
        self.charges.lock().unwrap().push(charge.clone());
        (self.charge)(charge)
    }

    async fn create_customer(&self, email: Option<&str>) -> PaymentResult<Customer> {
        if self.fail_customers {
            return Err(PaymentError::NetworkError("connection reset".to_string()));
        }
        self.customer_emails
            .lock()
            .unwrap()
            .push(email.map(String::from));
        Ok(Customer {
            id: format!("cus_{}", self.next_id()),
            email: email.map(String::from),
        })
    }

    async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> PaymentResult<CheckoutSession> {
        self.sessions.lock().unwrap().push(params.clone());
        Ok(CheckoutSession {
            id: format!("cs_test_{}", self.next_id()),
            url: None,
            customer: Some(params.customer_id.clone()),
            mode: CheckoutMode::Setup,
        })
    }

    fn verifies_webhooks(&self) -> bool {
        false
    }

    fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> PaymentResult<WebhookEvent> {
        Err(PaymentError::Configuration("no webhook secret".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

pub fn card_method(id: &str) -> PaymentMethod {
    PaymentMethod {
        id: id.to_string(),
        method_type: "card".to_string(),
        card: Some(Card {
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 12,
            exp_year: 2031,
            country: None,
            funding: None,
            extra: Default::default(),
        }),
        customer: Some("cus_1".to_string()),
    }
}

pub fn intent(secret: &str) -> PaymentIntent {
    PaymentIntent {
        id: "pi_test".to_string(),
        client_secret: Some(secret.to_string()),
        status: PaymentIntentStatus::Succeeded,
        amount: 2900,
        currency: "eur".to_string(),
        customer: Some("cus_1".to_string()),
    }
}

pub fn test_config(static_dir: &Path) -> AppConfig {
    let static_dir = static_dir.to_string_lossy().to_string();
    AppConfig::from_lookup(move |key| match key {
        "STATIC_DIR" => Some(static_dir.clone()),
        "DOMAIN" => Some("https://example.com".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn fake_state(provider: Arc<FakeProvider>, static_dir: &Path) -> AppState {
    AppState::with_provider(test_config(static_dir), provider, PUBLISHABLE_KEY)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn json_body(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}
