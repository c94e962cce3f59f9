//! # Routes
//!
//! Axum router configuration for the enrollment payment API.

use crate::auth;
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health, GET / - Health check
/// - POST /api/v1/payment/capture - Create payment intent (caller identity required)
/// - POST /webhook/stripe - Stripe webhook (raw body, `stripe-signature` header)
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new()
        .route("/capture", post(handlers::capture_payment))
        .route_layer(middleware::from_fn(auth::forwarded_identity));

    // Webhook routes must see the raw body
    let webhook_routes = Router::new().route("/stripe", post(handlers::stripe_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1/payment", payment_routes)
        .nest("/webhook", webhook_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use enroll_core::{
        CheckoutError, CheckoutResult, InMemoryStore, IntentRequest, MailMessage, MailReceipt,
        MailSender, PaymentIntent, PaymentProcessor, WebhookEvent,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    struct OfflineProcessor;

    #[async_trait]
    impl PaymentProcessor for OfflineProcessor {
        async fn create_payment_intent(&self, _: &IntentRequest) -> CheckoutResult<PaymentIntent> {
            Err(CheckoutError::processor("offline"))
        }

        async fn construct_event(&self, _: &[u8], _: &str) -> CheckoutResult<WebhookEvent> {
            Err(CheckoutError::Signature("offline".to_string()))
        }

        fn provider_name(&self) -> &'static str {
            "offline"
        }
    }

    struct NoMail;

    #[async_trait]
    impl MailSender for NoMail {
        async fn send_mail(&self, _: &MailMessage) -> Option<MailReceipt> {
            None
        }
    }

    fn app() -> Router {
        let store = InMemoryStore::new();
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(OfflineProcessor),
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(NoMail),
        );
        create_router(state)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_capture_requires_identity() {
        let response = app()
            .oneshot(
                Request::post("/api/v1/payment/capture")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"course_id":"c1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_webhook_without_signature_is_rejected() {
        let response = app()
            .oneshot(
                Request::post("/webhook/stripe")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
