//! # enroll-stripe
//!
//! Stripe payment processor for course enrollment.
//!
//! `StripePaymentIntents` implements `PaymentProcessor`:
//! - creates PaymentIntents (amount in paise, fixed INR, course/user metadata)
//! - verifies `Stripe-Signature` headers over the raw webhook body and parses
//!   the event envelope
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use enroll_stripe::StripePaymentIntents;
//! use enroll_core::{IntentRequest, PaymentProcessor};
//!
//! let stripe = StripePaymentIntents::from_env()?;
//! let intent = stripe.create_payment_intent(&IntentRequest::for_course(&course, &user_id)).await?;
//!
//! // In the webhook endpoint:
//! let event = stripe.construct_event(&body, signature).await?;
//! ```

pub mod config;
pub mod intents;
pub mod webhook;

// Re-exports
pub use config::StripeConfig;
pub use intents::StripePaymentIntents;
pub use webhook::{
    print_webhook_setup_instructions, sign_payload, verify_signature, REQUIRED_WEBHOOK_EVENTS,
};
