//! `POST /webhook/stripe`

mod common;

use axum::http::StatusCode;
use common::*;
use enroll_api::handlers::ENROLLMENT_SUBJECT;
use enroll_stripe::sign_payload;
use serde_json::{json, Value};

const WEBHOOK: &str = "/webhook/stripe";

async fn deliver(app: &TestApp, payload: Vec<u8>, signature: &str) -> axum_test::TestResponse {
    let (name, value) = signature_header(signature);
    app.server
        .post(WEBHOOK)
        .add_header(name, value)
        .bytes(payload.into())
        .await
}

#[tokio::test]
async fn succeeded_payment_enrolls_and_notifies() {
    let app = TestApp::spawn().await;
    let payload = succeeded_payload("evt_1", COURSE_ID, USER_ID);
    let signature = sign(&payload);

    let response = deliver(&app, payload, &signature).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "success": true, "message": "Signature Verified and Course Added" })
    );

    assert!(app.course(COURSE_ID).await.is_enrolled(USER_ID));
    assert_eq!(app.user(USER_ID).await.courses, vec![COURSE_ID.to_string()]);

    let sent = app.mailer.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, USER_EMAIL);
    assert_eq!(sent[0].subject, ENROLLMENT_SUBJECT);
}

#[tokio::test]
async fn tampered_payload_is_rejected_without_side_effects() {
    let app = TestApp::spawn().await;
    let signed = succeeded_payload("evt_1", COURSE_ID, USER_ID);
    let signature = sign(&signed);
    let tampered = succeeded_payload("evt_1", COURSE_ID, ENROLLED_USER_ID);

    let response = deliver(&app, tampered, &signature).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Webhook Error: "));

    assert!(!app.course(COURSE_ID).await.is_enrolled(USER_ID));
    assert!(app.user(USER_ID).await.courses.is_empty());
    assert!(app.mailer.messages().is_empty());
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(WEBHOOK)
        .bytes(succeeded_payload("evt_1", COURSE_ID, USER_ID).into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Webhook Error: No stripe-signature header value was provided."
    );
}

#[tokio::test]
async fn stale_signature_is_rejected() {
    let app = TestApp::spawn().await;
    let payload = succeeded_payload("evt_1", COURSE_ID, USER_ID);
    let an_hour_ago = chrono::Utc::now().timestamp() - 3600;
    let signature = sign_payload(WEBHOOK_SECRET, an_hour_ago, &payload).unwrap();

    let response = deliver(&app, payload, &signature).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.user(USER_ID).await.courses.is_empty());
}

#[tokio::test]
async fn other_event_types_are_rejected() {
    let app = TestApp::spawn().await;
    let payload = event_payload(
        "evt_2",
        "payment_intent.payment_failed",
        json!({ "courseId": COURSE_ID, "userId": USER_ID }),
    );
    let signature = sign(&payload);

    let response = deliver(&app, payload, &signature).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": false, "message": "Invalid event type" }));
    assert!(!app.course(COURSE_ID).await.is_enrolled(USER_ID));
}

#[tokio::test]
async fn replayed_event_enrolls_twice_by_default() {
    let app = TestApp::spawn().await;
    let payload = succeeded_payload("evt_1", COURSE_ID, USER_ID);

    for _ in 0..2 {
        let signature = sign(&payload);
        deliver(&app, payload.clone(), &signature)
            .await
            .assert_status_ok();
    }

    let course = app.course(COURSE_ID).await;
    let occurrences = course
        .students_enrolled
        .iter()
        .filter(|id| id.as_str() == USER_ID)
        .count();
    assert_eq!(occurrences, 2);
    assert_eq!(app.user(USER_ID).await.courses.len(), 2);
    assert_eq!(app.mailer.messages().len(), 2);
}

#[tokio::test]
async fn replayed_event_is_skipped_with_dedup() {
    let app = TestApp::spawn_with(TestAppOptions {
        dedup: true,
        ..Default::default()
    })
    .await;
    let payload = succeeded_payload("evt_1", COURSE_ID, USER_ID);

    let signature = sign(&payload);
    deliver(&app, payload.clone(), &signature)
        .await
        .assert_status_ok();

    let signature = sign(&payload);
    let response = deliver(&app, payload, &signature).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true, "message": "Event already processed" }));

    assert_eq!(app.user(USER_ID).await.courses.len(), 1);
    assert_eq!(app.mailer.messages().len(), 1);
}

#[tokio::test]
async fn mail_failure_does_not_fail_enrollment() {
    let app = TestApp::spawn_with(TestAppOptions {
        failing_mail: true,
        ..Default::default()
    })
    .await;
    let payload = succeeded_payload("evt_1", COURSE_ID, USER_ID);
    let signature = sign(&payload);

    let response = deliver(&app, payload, &signature).await;

    response.assert_status_ok();
    assert!(app.course(COURSE_ID).await.is_enrolled(USER_ID));
    assert_eq!(app.mailer.messages().len(), 1);
}

#[tokio::test]
async fn missing_metadata_is_a_server_error() {
    let app = TestApp::spawn().await;
    let payload = event_payload(
        "evt_3",
        "payment_intent.succeeded",
        json!({ "courseId": COURSE_ID }),
    );
    let signature = sign(&payload);

    let response = deliver(&app, payload, &signature).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(!app.course(COURSE_ID).await.is_enrolled(USER_ID));
}

#[tokio::test]
async fn unknown_course_is_a_server_error() {
    let app = TestApp::spawn().await;
    let payload = succeeded_payload("evt_4", "course-gone", USER_ID);
    let signature = sign(&payload);

    let response = deliver(&app, payload, &signature).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Course not Found");
    assert!(app.user(USER_ID).await.courses.is_empty());
}

#[tokio::test]
async fn unknown_user_leaves_course_side_applied() {
    let app = TestApp::spawn().await;
    let payload = succeeded_payload("evt_5", ORPHAN_COURSE_ID, "user-gone");
    let signature = sign(&payload);

    let response = deliver(&app, payload, &signature).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "User not Found");

    // The two pushes are independent writes
    assert!(app.course(ORPHAN_COURSE_ID).await.is_enrolled("user-gone"));
    assert!(app.mailer.messages().is_empty());
}

#[tokio::test]
async fn concurrent_replays_enroll_once_with_dedup() {
    let app = TestApp::spawn_with(TestAppOptions {
        dedup: true,
        slow_mail: true,
        ..Default::default()
    })
    .await;
    let payload = succeeded_payload("evt_1", COURSE_ID, USER_ID);
    let signature = sign(&payload);

    let (first, second) = tokio::join!(
        deliver(&app, payload.clone(), &signature),
        deliver(&app, payload, &signature)
    );

    first.assert_status_ok();
    second.assert_status_ok();
    let mut messages = vec![
        first.json::<Value>()["message"].as_str().unwrap().to_string(),
        second.json::<Value>()["message"].as_str().unwrap().to_string(),
    ];
    messages.sort();
    assert_eq!(
        messages,
        vec!["Event already processed", "Signature Verified and Course Added"]
    );

    assert_eq!(app.user(USER_ID).await.courses, vec![COURSE_ID.to_string()]);
    assert_eq!(app.mailer.messages().len(), 1);
}

#[tokio::test]
async fn failed_enrollment_releases_the_event_for_redelivery() {
    let app = TestApp::spawn_with(TestAppOptions {
        dedup: true,
        ..Default::default()
    })
    .await;
    let payload = succeeded_payload("evt_6", ORPHAN_COURSE_ID, "user-gone");

    for _ in 0..2 {
        let signature = sign(&payload);
        let response = deliver(&app, payload.clone(), &signature).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["message"], "User not Found");
    }

    let course = app.course(ORPHAN_COURSE_ID).await;
    assert_eq!(course.students_enrolled, vec!["user-gone", "user-gone"]);
}

#[tokio::test]
async fn store_failure_during_enrollment_is_a_server_error() {
    let app = TestApp::spawn_with(TestAppOptions {
        failing_courses: true,
        ..Default::default()
    })
    .await;
    let payload = succeeded_payload("evt_7", COURSE_ID, USER_ID);
    let signature = sign(&payload);

    let response = deliver(&app, payload, &signature).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "success": false, "message": "connection reset by peer" })
    );
    assert!(app.user(USER_ID).await.courses.is_empty());
    assert!(app.mailer.messages().is_empty());
}
