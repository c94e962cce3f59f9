//! # Request Handlers
//!
//! Axum request handlers for payment initiation and confirmation.
//!
//! Failures answer `{success: false, message}`. Business-rule failures of
//! the initiation endpoint keep HTTP 200; clients read the `success` flag.

use crate::auth::RequireAuth;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use enroll_core::{
    CheckoutError, CheckoutResult, IntentRequest, MailMessage, PaymentSucceededData,
    ProcessedEvent, User, WebhookEventType,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// Subject of the enrollment confirmation email
pub const ENROLLMENT_SUBJECT: &str = "Congratulations from CodeHelp";

/// Body of the enrollment confirmation email
pub const ENROLLMENT_BODY: &str = "Congratulations, you are onboarded into new CodeHelp Course";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Capture payment request
#[derive(Debug, Default, Deserialize)]
pub struct CapturePaymentRequest {
    #[serde(default)]
    pub course_id: Option<String>,
}

impl CapturePaymentRequest {
    /// Parse a request body; an unreadable body counts as a missing course id.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// Capture payment response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePaymentResponse {
    pub success: bool,
    pub course_name: String,
    pub course_description: String,
    pub thumbnail: String,
    pub client_secret: String,
    pub payment_intent_id: String,
    pub currency: String,
    pub amount: i64,
}

/// `{success, message}` body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse>);

fn checkout_error_to_response(err: CheckoutError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::failure(err.public_message())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "course-enroll",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a payment intent for the caller to buy a course
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn capture_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: Bytes,
) -> Result<Json<CapturePaymentResponse>, ApiError> {
    let request = CapturePaymentRequest::from_body(&body);

    capture_payment_internal(&state, request.course_id.as_deref(), &user.id)
        .await
        .map(Json)
        .map_err(|e| {
            match &e {
                CheckoutError::ExternalService { .. } | CheckoutError::Store(_) => {
                    error!("Failed to capture payment: {}", e)
                }
                _ => info!("Payment not initiated: {}", e),
            }
            checkout_error_to_response(e)
        })
}

async fn capture_payment_internal(
    state: &AppState,
    course_id: Option<&str>,
    user_id: &str,
) -> CheckoutResult<CapturePaymentResponse> {
    let course_id = course_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| CheckoutError::Validation("Please provide valid course ID".to_string()))?;

    let course = state
        .courses
        .find_course(course_id)
        .await?
        .ok_or_else(|| CheckoutError::CourseNotFound {
            course_id: course_id.to_string(),
        })?;

    if course.is_enrolled(user_id) {
        return Err(CheckoutError::AlreadyEnrolled {
            course_id: course.id,
            user_id: user_id.to_string(),
        });
    }

    let request = IntentRequest::for_course(&course, user_id);

    info!(
        "Creating payment intent: course={}, amount={} {}",
        course.id, request.amount, request.currency
    );

    let intent = state.processor.create_payment_intent(&request).await?;

    info!("Created payment intent: {}", intent.id);

    Ok(CapturePaymentResponse {
        success: true,
        course_name: course.name,
        course_description: course.description,
        thumbnail: course.thumbnail,
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
        currency: intent.currency,
        amount: intent.amount,
    })
}

/// Handle Stripe webhook
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    confirm_payment(&state, &headers, &body)
        .await
        .map(|message| Json(ApiResponse::ok(message)))
        .map_err(|e| {
            error!("Webhook handling failed: {}", e);
            checkout_error_to_response(e)
        })
}

async fn confirm_payment(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> CheckoutResult<&'static str> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            CheckoutError::Signature("No stripe-signature header value was provided.".to_string())
        })?;

    let event = state.processor.construct_event(body, signature).await?;

    info!(
        "Received webhook: type={}, id={}",
        event.event_type.as_str(),
        event.event_id
    );

    if event.event_type != WebhookEventType::PaymentSucceeded {
        return Err(CheckoutError::UnsupportedEvent {
            event_type: event.event_type.as_str().to_string(),
        });
    }

    let data = PaymentSucceededData::from_event(&event)?;

    let Some(processed) = &state.processed_events else {
        enroll_student(state, &data).await?;
        return Ok("Signature Verified and Course Added");
    };

    let claim = ProcessedEvent::new(event.event_id.clone(), event.event_type.as_str());
    if !processed.claim(claim).await? {
        info!("Skipping already processed event {}", event.event_id);
        return Ok("Event already processed");
    }

    if let Err(e) = enroll_student(state, &data).await {
        // A partial enrollment may remain; the redelivery retries both pushes.
        if let Err(release_err) = processed.release(&event.event_id).await {
            error!(
                "Failed to release claim on event {}: {}",
                event.event_id, release_err
            );
        }
        return Err(e);
    }

    Ok("Signature Verified and Course Added")
}

/// Push the student into the course, the course into the student, then
/// notify. The two pushes are independent writes.
async fn enroll_student(
    state: &AppState,
    data: &PaymentSucceededData,
) -> CheckoutResult<User> {
    state
        .courses
        .push_student(&data.course_id, &data.user_id)
        .await?
        .ok_or_else(|| CheckoutError::EnrollmentTargetNotFound {
            entity: "Course",
            id: data.course_id.clone(),
        })?;

    let user = state
        .users
        .push_course(&data.user_id, &data.course_id)
        .await?
        .ok_or_else(|| CheckoutError::EnrollmentTargetNotFound {
            entity: "User",
            id: data.user_id.clone(),
        })?;

    info!(
        "Enrolled user {} in course {} (payment {:?})",
        data.user_id, data.course_id, data.payment_intent_id
    );

    let message = MailMessage::new(user.email.clone(), ENROLLMENT_SUBJECT, ENROLLMENT_BODY);
    if state.mailer.send_mail(&message).await.is_none() {
        warn!("Enrollment email to {} was not delivered", user.email);
    }

    Ok(user)
}
