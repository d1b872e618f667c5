//! # pay-api
//!
//! HTTP API layer for offsession-pay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Endpoints for publishable-key distribution, off-session charging and
//!   checkout-session creation
//! - Webhook handler for payment events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | index.html |
//! | GET | `/health` | Health check |
//! | GET | `/config` | Publishable key and price |
//! | GET | `/charge-card-off-session` | Charge a saved card |
//! | POST | `/create-checkout-session` | Create checkout session |
//! | POST | `/webhook` | Stripe webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
