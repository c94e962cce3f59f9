//! Shared fixtures for the HTTP integration tests.
//!
//! The app runs against the real Stripe processor pointed at a wiremock
//! server, an in-memory store seeded with a small catalog and a mail
//! sender that records what it was asked to deliver.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use enroll_api::{create_router, AppConfig, AppState};
use enroll_core::{
    CheckoutError, CheckoutResult, Course, CourseStore, InMemoryProcessedEvents, InMemoryStore,
    MailMessage, MailReceipt, MailSender, User,
};
use enroll_stripe::{sign_payload, StripeConfig, StripePaymentIntents};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

pub const SECRET_KEY: &str = "sk_test_enroll";
pub const WEBHOOK_SECRET: &str = "whsec_enroll_test";

pub const COURSE_ID: &str = "course-rust";
pub const ORPHAN_COURSE_ID: &str = "course-orphan";
pub const USER_ID: &str = "user-1";
pub const ENROLLED_USER_ID: &str = "user-enrolled";
pub const USER_EMAIL: &str = "learner@example.com";

/// Mail sender that keeps every message it was handed
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
    pub fail: bool,
    /// Relay round-trip to simulate before answering
    pub latency: Option<Duration>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn slow(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Default::default()
        }
    }

    pub fn messages(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send_mail(&self, message: &MailMessage) -> Option<MailReceipt> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return None;
        }
        Some(MailReceipt {
            message_id: format!("<{}@test>", self.sent.lock().unwrap().len()),
            response: "250 OK".to_string(),
        })
    }
}

/// Course store whose backend is down
pub struct FailingCourseStore;

#[async_trait]
impl CourseStore for FailingCourseStore {
    async fn find_course(&self, _course_id: &str) -> CheckoutResult<Option<Course>> {
        Err(CheckoutError::Store("connection reset by peer".to_string()))
    }

    async fn push_student(&self, _: &str, _: &str) -> CheckoutResult<Option<Course>> {
        Err(CheckoutError::Store("connection reset by peer".to_string()))
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub stripe: MockServer,
    pub store: InMemoryStore,
    pub mailer: Arc<RecordingMailer>,
}

#[derive(Default)]
pub struct TestAppOptions {
    pub dedup: bool,
    pub failing_mail: bool,
    pub slow_mail: bool,
    pub failing_courses: bool,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestAppOptions::default()).await
    }

    pub async fn spawn_with(options: TestAppOptions) -> Self {
        let stripe = MockServer::start().await;
        let store = seeded_store().await;
        let mailer = Arc::new(if options.failing_mail {
            RecordingMailer::failing()
        } else if options.slow_mail {
            RecordingMailer::slow(Duration::from_millis(200))
        } else {
            RecordingMailer::default()
        });

        let config = StripeConfig::new(SECRET_KEY, WEBHOOK_SECRET).with_api_base_url(stripe.uri());
        let processor = StripePaymentIntents::new(config).unwrap();

        let courses: enroll_core::SharedCourseStore = if options.failing_courses {
            Arc::new(FailingCourseStore)
        } else {
            Arc::new(store.clone())
        };

        let mut state = AppState::new(
            AppConfig {
                webhook_dedup: options.dedup,
                ..Default::default()
            },
            Arc::new(processor),
            courses,
            Arc::new(store.clone()),
            mailer.clone(),
        );
        if options.dedup {
            state = state.with_processed_events(Arc::new(InMemoryProcessedEvents::new()));
        }

        let server = TestServer::new(create_router(state)).unwrap();

        Self {
            server,
            stripe,
            store,
            mailer,
        }
    }

    pub async fn course(&self, id: &str) -> Course {
        CourseStore::find_course(&self.store, id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn user(&self, id: &str) -> User {
        enroll_core::UserStore::find_user(&self.store, id)
            .await
            .unwrap()
            .unwrap()
    }
}

async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .insert_course(
            Course::new(COURSE_ID, "Rust Basics", 499.0)
                .with_description("Ownership, borrowing and lifetimes")
                .with_thumbnail("https://cdn.example.com/rust.png")
                .with_student(ENROLLED_USER_ID),
        )
        .await;
    store
        .insert_course(Course::new(ORPHAN_COURSE_ID, "Async Rust", 799.5))
        .await;
    store.insert_user(User::new(USER_ID, USER_EMAIL)).await;
    store
        .insert_user(User::new(ENROLLED_USER_ID, "enrolled@example.com"))
        .await;
    store
}

pub fn user_header(user_id: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(user_id).unwrap(),
    )
}

pub fn signature_header(value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("stripe-signature"),
        HeaderValue::from_str(value).unwrap(),
    )
}

/// Raw body of a Stripe event wrapping a payment intent
pub fn event_payload(event_id: &str, event_type: &str, metadata: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": event_id,
        "object": "event",
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "data": {
            "object": {
                "id": "pi_3Nq",
                "object": "payment_intent",
                "amount_received": 49900,
                "currency": "inr",
                "metadata": metadata
            }
        }
    }))
    .unwrap()
}

pub fn succeeded_payload(event_id: &str, course_id: &str, user_id: &str) -> Vec<u8> {
    event_payload(
        event_id,
        "payment_intent.succeeded",
        json!({ "courseId": course_id, "userId": user_id }),
    )
}

/// `stripe-signature` value for `payload` signed now
pub fn sign(payload: &[u8]) -> String {
    sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), payload).unwrap()
}
