//! # enroll-api
//!
//! HTTP API layer for course enrollment payments.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Payment initiation endpoint (creates a Stripe PaymentIntent)
//! - Webhook endpoint confirming payment and enrolling the student
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/payment/capture` | Create payment intent for a course |
//! | POST | `/webhook/stripe` | Stripe webhook |

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, StoreBackend};
