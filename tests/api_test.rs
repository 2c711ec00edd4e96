//! Integration tests for the device and operator HTTP endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "memory");
    assert_eq!(response.data()["database_ok"], true);
}

#[tokio::test]
async fn test_happy_path_create_poll_complete() {
    let app = TestApp::new();
    app.register_device("phone-1").await;

    let id = app
        .create_task(json!({
            "device_id": "phone-1",
            "task_type": "send_message",
            "parameters": { "to": "+15550100", "text": "hi" }
        }))
        .await;

    let dispatched = app.poll("phone-1").await;
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0]["id"], id.as_str());
    assert_eq!(dispatched[0]["status"], "running");
    assert_eq!(dispatched[0]["parameters"]["text"], "hi");

    let response = app
        .request(
            "POST",
            &format!("/api/android/task/{id}/complete"),
            Some(json!({ "result": { "delivered": true } })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "completed");
    assert_eq!(response.data()["result"]["delivered"], true);
    assert!(response.data()["completed_at"].is_string());

    assert!(app.poll("phone-1").await.is_empty());
}

#[tokio::test]
async fn test_complete_without_body_stores_null_result() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let id = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "status_update" }))
        .await;
    app.poll("phone-1").await;

    let response = app
        .request("POST", &format!("/api/android/task/{id}/complete"), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "completed");
}

#[tokio::test]
async fn test_complete_twice_is_conflict() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let id = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_media" }))
        .await;
    app.poll("phone-1").await;

    let path = format!("/api/android/task/{id}/complete");
    let first = app.request("POST", &path, Some(json!({ "result": 1 }))).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app.request("POST", &path, Some(json!({ "result": 2 }))).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), "INVALID_STATE");

    let stored = app.request("GET", &format!("/api/tasks/{id}"), None).await;
    assert_eq!(stored.data()["result"], 1);
}

#[tokio::test]
async fn test_complete_pending_task_is_conflict() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let id = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_audio" }))
        .await;

    let response = app
        .request("POST", &format!("/api/android/task/{id}/complete"), None)
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_failure_schedules_retry_with_backoff() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let id = app
        .create_task(json!({
            "device_id": "phone-1",
            "task_type": "group_action",
            "max_retries": 3
        }))
        .await;
    app.poll("phone-1").await;

    let response = app
        .request(
            "POST",
            &format!("/api/android/task/{id}/fail"),
            Some(json!({ "error_message": "network unreachable" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let task = response.data();
    assert_eq!(task["status"], "pending");
    assert_eq!(task["retry_count"], 1);
    assert_eq!(task["error_message"], "network unreachable");
    assert!(task["started_at"].is_null());

    // Default fixed backoff keeps the task out of the next poll.
    assert!(app.poll("phone-1").await.is_empty());
}

#[tokio::test]
async fn test_retries_exhaust_then_manual_retry_is_refused() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let id = app
        .create_task(json!({
            "device_id": "phone-1",
            "task_type": "profile_update",
            "max_retries": 2
        }))
        .await;

    let fail_path = format!("/api/android/task/{id}/fail");
    let first = app
        .request("POST", &fail_path, Some(json!({ "error": "boom" })))
        .await;
    assert_eq!(first.data()["status"], "pending");

    let second = app
        .request("POST", &fail_path, Some(json!({ "error": "boom again" })))
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["status"], "failed");
    assert_eq!(second.data()["retry_count"], 2);

    let third = app
        .request("POST", &fail_path, Some(json!({ "error": "late" })))
        .await;
    assert_eq!(third.status, StatusCode::CONFLICT);

    let retry = app
        .request("POST", &format!("/api/tasks/{id}/retry"), None)
        .await;
    assert_eq!(retry.status, StatusCode::CONFLICT);
    assert_eq!(retry.error_code(), "RETRIES_EXHAUSTED");
}

#[tokio::test]
async fn test_manual_retry_skips_backoff() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let id = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "warmup_cycle" }))
        .await;
    app.poll("phone-1").await;
    app.request(
        "POST",
        &format!("/api/android/task/{id}/fail"),
        Some(json!({ "error": "timeout" })),
    )
    .await;
    assert!(app.poll("phone-1").await.is_empty());

    let retry = app
        .request("POST", &format!("/api/tasks/{id}/retry"), None)
        .await;
    assert_eq!(retry.status, StatusCode::OK);
    assert_eq!(retry.data()["status"], "pending");
    assert_eq!(retry.data()["retry_count"], 1);

    let dispatched = app.poll("phone-1").await;
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0]["id"], id.as_str());
}

#[tokio::test]
async fn test_poll_orders_by_priority_then_age() {
    let app = TestApp::new();
    app.register_device("phone-1").await;

    let low = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message", "priority": "low" }))
        .await;
    let normal = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;
    let urgent = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message", "priority": "urgent" }))
        .await;
    let high = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message", "priority": "high" }))
        .await;

    let dispatched = app.poll("phone-1").await;
    let ids: Vec<&str> = dispatched.iter().filter_map(|t| t["id"].as_str()).collect();
    assert_eq!(ids, vec![urgent.as_str(), high.as_str(), normal.as_str(), low.as_str()]);
}

#[tokio::test]
async fn test_poll_respects_limit_and_device() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    app.register_device("phone-2").await;
    for _ in 0..3 {
        app.create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
            .await;
    }
    app.create_task(json!({ "device_id": "phone-2", "task_type": "send_message" }))
        .await;

    let response = app
        .request("GET", "/api/android/task/poll?device_id=phone-1&limit=2", None)
        .await;
    assert_eq!(response.data().as_array().map(Vec::len), Some(2));

    let rest = app.poll("phone-1").await;
    assert_eq!(rest.len(), 1);
    assert!(rest.iter().all(|t| t["device_id"] == "phone-1"));
}

#[tokio::test]
async fn test_poll_unknown_device_is_not_found() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/android/task/poll?device_id=ghost", None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let app = TestApp::new();
    app.register_device("phone-1").await;

    let unknown_device = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "device_id": "ghost", "task_type": "send_message" })),
        )
        .await;
    assert_eq!(unknown_device.status, StatusCode::NOT_FOUND);

    let bad_priority = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "device_id": "phone-1", "task_type": "send_message", "priority": "asap" })),
        )
        .await;
    assert_eq!(bad_priority.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_priority.error_code(), "INVALID_ARGUMENT");

    let bad_type = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "device_id": "phone-1", "type": "reboot" })),
        )
        .await;
    assert_eq!(bad_type.status, StatusCode::BAD_REQUEST);

    let too_many_retries = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "device_id": "phone-1", "task_type": "send_message", "max_retries": 99 })),
        )
        .await;
    assert_eq!(too_many_retries.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_reports_each_item_in_order() {
    let app = TestApp::new();
    app.register_device("phone-1").await;

    let response = app
        .request(
            "POST",
            "/api/tasks/batch",
            Some(json!({
                "tasks": [
                    { "device_id": "phone-1", "task_type": "send_message" },
                    { "device_id": "ghost", "task_type": "send_message" },
                    { "device_id": "phone-1", "task_type": "send_media", "priority": "high" }
                ]
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["created"], 2);
    assert_eq!(data["failed"], 1);
    let results = data["results"].as_array().expect("results");
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[1]["error"]["error"], "NOT_FOUND");
    assert_eq!(results[2]["task"]["task_type"], "send_media");

    assert_eq!(app.poll("phone-1").await.len(), 2);
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/tasks/batch", Some(json!({ "tasks": [] })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["details"]["tasks"].is_array());
}

#[tokio::test]
async fn test_list_and_stats() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    app.register_device("phone-2").await;
    app.create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;
    app.create_task(json!({ "device_id": "phone-1", "task_type": "send_media" }))
        .await;
    app.create_task(json!({ "device_id": "phone-2", "task_type": "send_audio" }))
        .await;
    app.poll("phone-2").await;

    let all = app.request("GET", "/api/tasks", None).await;
    assert_eq!(all.data()["total_items"], 3);

    let phone1 = app
        .request("GET", "/api/tasks?device_id=phone-1&page_size=1", None)
        .await;
    assert_eq!(phone1.data()["total_items"], 2);
    assert_eq!(phone1.data()["total_pages"], 2);
    assert_eq!(phone1.data()["items"].as_array().map(Vec::len), Some(1));

    let running = app.request("GET", "/api/tasks?status=running", None).await;
    assert_eq!(running.data()["total_items"], 1);

    let bad_status = app.request("GET", "/api/tasks?status=archived", None).await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

    let stats = app.request("GET", "/api/tasks/stats", None).await;
    assert_eq!(stats.data()["pending"], 2);
    assert_eq!(stats.data()["running"], 1);

    let device_stats = app
        .request("GET", "/api/tasks/stats?device_id=phone-2", None)
        .await;
    assert_eq!(device_stats.data()["pending"], 0);
    assert_eq!(device_stats.data()["running"], 1);
}

#[tokio::test]
async fn test_purge_removes_only_terminal_tasks() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let done = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;
    let waiting = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message", "priority": "low" }))
        .await;
    app.request("GET", "/api/android/task/poll?device_id=phone-1&limit=1", None)
        .await;
    app.request("POST", &format!("/api/android/task/{done}/complete"), None)
        .await;

    let response = app
        .request(
            "POST",
            "/api/tasks/purge",
            Some(json!({ "older_than_days": 0, "statuses": ["completed", "pending"] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deleted"], 1);

    let gone = app.request("GET", &format!("/api/tasks/{done}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let kept = app.request("GET", &format!("/api/tasks/{waiting}"), None).await;
    assert_eq!(kept.status, StatusCode::OK);
}

#[tokio::test]
async fn test_purge_with_empty_statuses_removes_both_terminal_states() {
    let app = TestApp::new();
    app.register_device("phone-1").await;
    let done = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message" }))
        .await;
    let failed = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message", "max_retries": 0 }))
        .await;
    let waiting = app
        .create_task(json!({ "device_id": "phone-1", "task_type": "send_message", "priority": "low" }))
        .await;
    app.request("GET", "/api/android/task/poll?device_id=phone-1&limit=2", None)
        .await;
    app.request("POST", &format!("/api/android/task/{done}/complete"), None)
        .await;
    app.request(
        "POST",
        &format!("/api/android/task/{failed}/fail"),
        Some(json!({ "error": "banned" })),
    )
    .await;

    let response = app
        .request(
            "POST",
            "/api/tasks/purge",
            Some(json!({ "older_than_days": 0, "statuses": [] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deleted"], 2);
    let kept = app.request("GET", &format!("/api/tasks/{waiting}"), None).await;
    assert_eq!(kept.status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_task_id_is_bad_request() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/tasks/not-a-uuid", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_device_registration_and_heartbeat() {
    let app = TestApp::new();

    let registered = app
        .request(
            "POST",
            "/api/android/register",
            Some(json!({ "device_id": "phone-1", "name": "  Pixel 7  " })),
        )
        .await;
    assert_eq!(registered.status, StatusCode::OK);
    assert_eq!(registered.data()["name"], "Pixel 7");
    assert_eq!(registered.data()["is_online"], true);

    let heartbeat = app
        .request(
            "POST",
            "/api/android/heartbeat",
            Some(json!({ "device_id": "phone-1" })),
        )
        .await;
    assert_eq!(heartbeat.status, StatusCode::OK);

    let unknown = app
        .request(
            "POST",
            "/api/android/heartbeat",
            Some(json!({ "device_id": "ghost" })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let listed = app.request("GET", "/api/devices", None).await;
    assert_eq!(listed.data()["total_items"], 1);

    let fetched = app.request("GET", "/api/devices/phone-1", None).await;
    assert_eq!(fetched.data()["device_id"], "phone-1");

    let missing = app.request("GET", "/api/devices/ghost", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_rejects_empty_device_id() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/android/register",
            Some(json!({ "device_id": "" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
