//! # Payment Processor Trait
//!
//! Seam between the enrollment flow and the third-party payment processor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 PaymentProcessor (trait)                    │
//! │  ├── create_payment_intent()                                │
//! │  ├── construct_event()                                      │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │                   │
//!          ┌───────┴───────┐   ┌───────┴───────┐
//!          │ StripePayment │   │  test fakes   │
//!          │    Intents    │   │               │
//!          └───────────────┘   └───────────────┘
//! ```

use crate::error::CheckoutResult;
use crate::intent::{IntentRequest, PaymentIntent, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment processor implementations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Ask the processor to create a payment intent.
    ///
    /// # Returns
    /// The processor's intent, including the client secret handed to the
    /// browser.
    async fn create_payment_intent(&self, request: &IntentRequest) -> CheckoutResult<PaymentIntent>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request
    ///
    /// # Returns
    /// A parsed `WebhookEvent` if the signature is valid, otherwise
    /// `CheckoutError::Signature`.
    async fn construct_event(&self, payload: &[u8], signature: &str)
        -> CheckoutResult<WebhookEvent>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;

    /// Get the webhook endpoint path for this provider.
    /// Default: `/webhook/{provider_name}`
    fn webhook_path(&self) -> String {
        format!("/webhook/{}", self.provider_name())
    }
}

/// Type alias for a shared payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
