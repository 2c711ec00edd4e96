//! Integration tests for event fan-out from HTTP operations to listeners.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tokio::sync::broadcast::Receiver;

use helpers::TestApp;
use warmup_realtime::OutboundMessage;

async fn next_event(rx: &mut Receiver<OutboundMessage>) -> (String, &'static str) {
    let message = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no message within 1s")
        .expect("channel closed");
    match message {
        OutboundMessage::Event { channel, event } => (channel, event.name()),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_task_lifecycle_reaches_both_channels() {
    let app = TestApp::new();
    app.register_device("phone-1").await;

    let mut fleet = app.state.pubsub.subscribe("tasks").await;
    let mut device = app.state.pubsub.subscribe("device:phone-1").await;

    let id = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;
    assert_eq!(next_event(&mut fleet).await, ("tasks".to_string(), "task_created"));
    assert_eq!(
        next_event(&mut device).await,
        ("device:phone-1".to_string(), "task_created")
    );

    app.poll("phone-1").await;
    let response = app
        .request("POST", &format!("/api/android/task/{id}/complete"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(next_event(&mut fleet).await.1, "task_completed");
    assert_eq!(next_event(&mut device).await.1, "task_completed");
}

#[tokio::test]
async fn test_other_devices_do_not_see_foreign_events() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    app.register_device("phone-2").await;

    let mut other = app.state.pubsub.subscribe("device:phone-2").await;

    app.create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;

    assert!(other.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_task_event_is_published() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let id = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;

    let mut fleet = app.state.pubsub.subscribe("tasks").await;
    app.request(
        "POST",
        &format!("/api/android/task/{id}/fail"),
        Some(json!({ "error": "captcha" })),
    )
    .await;

    assert_eq!(next_event(&mut fleet).await.1, "task_failed");
}

#[tokio::test]
async fn test_operations_succeed_without_listeners() {
    let app = TestApp::new();
    app.register_device("phone-1").await;

    let id = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;

    assert_eq!(app.state.pubsub.subscriber_count("tasks").await, 0);
    assert_eq!(app.poll("phone-1").await[0]["id"], id.as_str());
}
