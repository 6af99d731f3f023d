//! End-to-end tests driving the router against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::{json, Value};
use task_api::store::InMemoryTaskStore;
use task_api::{router, TaskService};
use tower::ServiceExt;

#[fixture]
fn app() -> Router {
    let service = TaskService::new(Arc::new(InMemoryTaskStore::new()));
    router(service, Duration::from_secs(5))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[rstest]
#[tokio::test]
async fn health_reports_ok(app: Router) {
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Task Manager API is running");
    assert!(body["timestamp"].is_string());
}

#[rstest]
#[tokio::test]
async fn task_lifecycle(app: Router) {
    let (status, created) =
        send(&app, Method::POST, "/api/tasks", Some(json!({"title": "Buy milk"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["description"], "");
    assert_eq!(created["completed"], false);
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());

    let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"title": "Buy milk and eggs", "completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Buy milk and eggs");
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["description"], "");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Task deleted successfully"}));

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Task not found"}));
}

#[rstest]
#[case(json!({}), "Task title is required")]
#[case(json!({"title": "ab"}), "Title must be at least 3 characters long")]
#[case(json!({"title": "  ab  ", "completed": true}), "Title must be at least 3 characters long")]
#[tokio::test]
async fn create_rejects_invalid_title(app: Router, #[case] payload: Value, #[case] message: &str) {
    let (status, body) = send(&app, Method::POST, "/api/tasks", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], message);

    let (_, tasks) = send(&app, Method::GET, "/api/tasks", None).await;
    assert_eq!(tasks, json!([]));
}

#[rstest]
#[tokio::test]
async fn malformed_body_is_bad_request(app: Router) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tasks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[rstest]
#[tokio::test]
async fn list_is_newest_first(app: Router) {
    for title in ["first task", "second task", "third task"] {
        let (status, _) =
            send(&app, Method::POST, "/api/tasks", Some(json!({"title": title}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, tasks) = send(&app, Method::GET, "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["third task", "second task", "first task"]);
}

#[rstest]
#[case(Method::GET)]
#[case(Method::DELETE)]
#[tokio::test]
async fn malformed_id_is_bad_request(app: Router, #[case] method: Method) {
    let (status, body) = send(&app, method, "/api/tasks/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid task ID"}));
}

#[rstest]
#[tokio::test]
async fn update_unknown_task_is_not_found(app: Router) {
    let uri = format!("/api/tasks/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"title": "Anything"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");

    let (status, _) = send(&app, Method::PUT, "/api/tasks/42", Some(json!({"completed": true}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn rejected_update_leaves_task_unchanged(app: Router) {
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({"title": "Buy milk", "description": "  semi-skimmed "})),
    )
    .await;
    assert_eq!(created["description"], "semi-skimmed");
    let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"title": "ab"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title must be at least 3 characters long");

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, created);
}

#[rstest]
#[tokio::test]
async fn null_title_update_is_required(app: Router) {
    let (_, created) =
        send(&app, Method::POST, "/api/tasks", Some(json!({"title": "Buy milk"}))).await;
    let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"title": null}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Task title is required");

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({"completed": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Buy milk");
    assert_eq!(updated["completed"], true);
}
