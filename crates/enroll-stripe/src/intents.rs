//! # Stripe Payment Intents
//!
//! Implementation of the Stripe PaymentIntents API and webhook event
//! construction. The browser confirms the intent with its client secret;
//! the outcome comes back through `payment_intent.succeeded`.

use crate::config::StripeConfig;
use crate::webhook::verify_signature;
use async_trait::async_trait;
use chrono::Utc;
use enroll_core::{
    CheckoutError, CheckoutResult, IntentRequest, PaymentIntent, PaymentProcessor, WebhookEvent,
    WebhookEventType,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Stripe PaymentIntents processor
pub struct StripePaymentIntents {
    config: StripeConfig,
    client: Client,
}

impl StripePaymentIntents {
    /// Create a new Stripe processor
    pub fn new(config: StripeConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                CheckoutError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Form parameters for `POST /v1/payment_intents`
    fn form_params(request: &IntentRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.as_str().to_string()),
        ];

        let mut keys: Vec<&String> = request.metadata.keys().collect();
        keys.sort();
        for key in keys {
            params.push((format!("metadata[{}]", key), request.metadata[key].clone()));
        }

        params
    }
}

#[async_trait]
impl PaymentProcessor for StripePaymentIntents {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_payment_intent(&self, request: &IntentRequest) -> CheckoutResult<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        let idempotency_key = Uuid::new_v4().to_string();

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&Self::form_params(request))
            .send()
            .await
            .map_err(|e| CheckoutError::processor(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::processor(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(CheckoutError::processor(error_response.error.message));
            }

            return Err(CheckoutError::processor(format!("HTTP {}: {}", status, body)));
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::processor(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe payment intent: id={}", intent.id);
        debug!("Payment intent: {}", body);

        Ok(PaymentIntent {
            id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
            client_secret: intent.client_secret,
            metadata: intent.metadata,
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn construct_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> CheckoutResult<WebhookEvent> {
        verify_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            Utc::now().timestamp(),
            self.config.tolerance_secs,
        )?;

        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            CheckoutError::Signature(format!("Failed to parse webhook: {}", e))
        })?;

        debug!("Verified Stripe webhook: id={}, type={}", event.id, event.event_type);

        Ok(WebhookEvent {
            event_id: event.id,
            event_type: WebhookEventType::from_stripe(&event.event_type),
            object: serde_json::Value::Object(event.data.object),
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    amount: i64,
    currency: String,
    client_secret: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}
