//! # Payment Intents and Webhook Events
//!
//! Processor-owned records as this service sees them. A payment intent is
//! created before the purchase; the processor later reports its outcome as
//! a signed webhook event carrying the same metadata.

use crate::course::Course;
use crate::currency::Currency;
use crate::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key correlating an intent with the purchased course
pub const METADATA_COURSE_ID: &str = "courseId";

/// Metadata key correlating an intent with the purchasing user
pub const METADATA_USER_ID: &str = "userId";

/// Parameters for a new payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRequest {
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub currency: Currency,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl IntentRequest {
    /// Build the intent for a user buying a course.
    ///
    /// The amount is fixed here and never re-validated downstream.
    pub fn for_course(course: &Course, user_id: &str) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(METADATA_COURSE_ID.to_string(), course.id.clone());
        metadata.insert(METADATA_USER_ID.to_string(), user_id.to_string());

        Self {
            amount: course.amount_due(),
            currency: course.currency(),
            metadata,
        }
    }
}

/// A payment intent as returned by the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    /// Currency code as echoed by the processor (e.g. "inr")
    pub currency: String,
    /// Opaque secret the client uses to confirm the payment
    pub client_secret: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// `payment_intent.succeeded`
    PaymentSucceeded,
    /// Anything else (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    pub fn from_stripe(event_type: &str) -> Self {
        match event_type {
            "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentSucceeded => "payment_intent.succeeded",
            WebhookEventType::Unknown(other) => other,
        }
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    pub event_type: WebhookEventType,

    /// The `data.object` payload of the event
    pub object: serde_json::Value,
}

/// Correlation data of a succeeded payment intent
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSucceededData {
    pub payment_intent_id: Option<String>,
    pub course_id: String,
    pub user_id: String,
    pub amount_received: Option<i64>,
}

impl PaymentSucceededData {
    /// Parse from a verified `payment_intent.succeeded` event
    pub fn from_event(event: &WebhookEvent) -> CheckoutResult<Self> {
        let metadata = event.object.get("metadata");
        let field = |key: &'static str| {
            metadata
                .and_then(|m| m.get(key))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or(CheckoutError::MissingMetadata(key))
        };

        Ok(Self {
            payment_intent_id: event
                .object
                .get("id")
                .and_then(|v| v.as_str())
                .map(String::from),
            course_id: field(METADATA_COURSE_ID)?,
            user_id: field(METADATA_USER_ID)?,
            amount_received: event
                .object
                .get("amount_received")
                .and_then(|v| v.as_i64()),
        })
    }
}
