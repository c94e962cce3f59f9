//! # enroll-core
//!
//! Core types and traits for course enrollment payments.
//!
//! This crate provides:
//! - `Course`, `User` and `Catalog` records
//! - `PaymentProcessor` trait for the payment provider
//! - `IntentRequest`, `PaymentIntent` and `WebhookEvent` for the payment flow
//! - `CourseStore`, `UserStore` and `ProcessedEventStore` persistence ports
//! - `MailSender` trait for transactional email
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use enroll_core::{Course, IntentRequest, PaymentProcessor};
//!
//! let course = courses.find_course(&course_id).await?.ok_or(...)?;
//!
//! // 499.00 INR becomes 49900 paise
//! let request = IntentRequest::for_course(&course, &user_id);
//! let intent = processor.create_payment_intent(&request).await?;
//!
//! // Hand intent.client_secret to the browser
//! ```

pub mod course;
pub mod currency;
pub mod error;
pub mod intent;
pub mod mail;
pub mod processor;
pub mod store;

// Re-exports for convenience
pub use course::{Catalog, Course, User};
pub use currency::{Currency, CHECKOUT_CURRENCY};
pub use error::{CheckoutError, CheckoutResult};
pub use intent::{
    IntentRequest, PaymentIntent, PaymentSucceededData, WebhookEvent, WebhookEventType,
    METADATA_COURSE_ID, METADATA_USER_ID,
};
pub use mail::{BoxedMailSender, MailMessage, MailReceipt, MailSender};
pub use processor::{BoxedPaymentProcessor, PaymentProcessor};
pub use store::{
    CourseStore, InMemoryProcessedEvents, InMemoryStore, ProcessedEvent, ProcessedEventStore,
    SharedCourseStore, SharedProcessedEventStore, SharedUserStore, UserStore,
};
