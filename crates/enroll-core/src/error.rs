//! # Checkout Error Types
//!
//! Typed error handling for the enrollment payment flow.
//! Every operation returns `Result<T, CheckoutError>`; handlers translate
//! the error into a `{success: false, message}` body at the boundary.

use thiserror::Error;

/// Core error type for initiation and confirmation
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Required input missing from the request
    #[error("{0}")]
    Validation(String),

    /// No course matches the requested id (initiation)
    #[error("Could not find the course")]
    CourseNotFound { course_id: String },

    /// Caller already appears in the course's enrolled set
    #[error("Student is already enrolled")]
    AlreadyEnrolled { course_id: String, user_id: String },

    /// Webhook signature or envelope could not be trusted
    #[error("Webhook Error: {0}")]
    Signature(String),

    /// Verified webhook of a type this service does not act on
    #[error("Invalid event type")]
    UnsupportedEvent { event_type: String },

    /// Course or user disappeared between payment and enrollment
    #[error("{entity} not Found")]
    EnrollmentTargetNotFound { entity: &'static str, id: String },

    /// Verified intent did not carry the correlation metadata
    #[error("Webhook metadata missing {0}")]
    MissingMetadata(&'static str),

    /// Payment processor or mail relay failure
    #[error("{service} error: {message}")]
    ExternalService { service: String, message: String },

    /// Record store failure; the message is surfaced verbatim
    #[error("{0}")]
    Store(String),

    /// Configuration errors (missing keys, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CheckoutError {
    /// Returns the HTTP status code reported for this error.
    ///
    /// Business-rule failures during initiation answer 200 with
    /// `success: false`; callers rely on that.
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Validation(_) => 200,
            CheckoutError::CourseNotFound { .. } => 200,
            CheckoutError::AlreadyEnrolled { .. } => 200,
            CheckoutError::ExternalService { .. } => 200,
            CheckoutError::Signature(_) => 400,
            CheckoutError::UnsupportedEvent { .. } => 400,
            CheckoutError::EnrollmentTargetNotFound { .. } => 500,
            CheckoutError::MissingMetadata(_) => 500,
            CheckoutError::Store(_) => 500,
            CheckoutError::Configuration(_) => 500,
        }
    }

    /// Message placed in the response body.
    ///
    /// External service details are logged, never returned to the caller.
    pub fn public_message(&self) -> String {
        match self {
            CheckoutError::ExternalService { .. } => "Could not initiate payment".to_string(),
            other => other.to_string(),
        }
    }

    /// Shorthand for a processor failure
    pub fn processor(message: impl Into<String>) -> Self {
        CheckoutError::ExternalService {
            service: "stripe".to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
