mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::TestApp;
use lesson_assist::adapters::http::build_router;
use lesson_assist::services::AssistantService;
use tower::ServiceExt;

const STUDENT: i64 = 7;

fn router(service: AssistantService) -> Router {
    build_router(Arc::new(service), false)
}

fn post_ask(user: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/assistant/ask")
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_usage(user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/assistant/usage");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn app_with_student() -> TestApp {
    let app = TestApp::new().await;
    app.seed_user(STUDENT, "ada").await;
    app
}

#[tokio::test]
async fn test_health() {
    let app = app_with_student().await;
    let response = router(app.assistant(100))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_ask_success() {
    let app = app_with_student().await;
    app.model.set_reply("A variable names a value.");

    let (status, json) = send(
        router(app.assistant(100)),
        post_ask(Some("7"), r#"{"message": "What is a variable?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "A variable names a value.");
    assert_eq!(json["sources"], serde_json::json!([]));
    assert_eq!(json["usage_today"], 1);
}

#[tokio::test]
async fn test_ask_requires_identity() {
    let app = app_with_student().await;

    let (status, json) = send(
        router(app.assistant(100)),
        post_ask(None, r#"{"message": "hi"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].is_string());

    let (status, _) = send(
        router(app.assistant(100)),
        post_ask(Some("not-a-number"), r#"{"message": "hi"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ask_malformed_json() {
    let app = app_with_student().await;

    let (status, json) = send(router(app.assistant(100)), post_ask(Some("7"), "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_ask_empty_message() {
    let app = app_with_student().await;

    let (status, json) = send(
        router(app.assistant(100)),
        post_ask(Some("7"), r#"{"message": "   "}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Message is required");
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_ask_quota_exceeded() {
    let app = app_with_student().await;
    let service = Arc::new(app.assistant(1));
    let routes = build_router(service, false);

    let (status, _) = send(routes.clone(), post_ask(Some("7"), r#"{"message": "first"}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(routes, post_ask(Some("7"), r#"{"message": "second"}"#)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
    assert!(json["error"].as_str().unwrap().contains('1'));
}

#[tokio::test]
async fn test_ask_generation_failed() {
    let app = app_with_student().await;
    app.model.fail_completions(true);

    let (status, json) = send(
        router(app.assistant(100)),
        post_ask(Some("7"), r#"{"message": "hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert_eq!(json["error"], "Failed to generate response. Please try again.");
}

#[tokio::test]
async fn test_unavailable_store_precedes_payload_checks() {
    let app = app_with_student().await;
    let service = app.assistant_with_store(100, app.unavailable_store());
    let routes = router(service);

    let (status, json) = send(routes.clone(), post_ask(Some("7"), "{not json")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");

    let (status, json) = send(routes, get_usage(Some("7"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["available"], false);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_usage_endpoint() {
    let app = app_with_student().await;
    let routes = router(app.assistant(100));

    let (status, _) = send(routes.clone(), post_ask(Some("7"), r#"{"message": "hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(routes.clone(), get_usage(Some("7"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["questions_today"], 1);
    assert_eq!(json["daily_limit"], 100);
    assert_eq!(json["available"], true);
    assert!(json.get("message").is_none());

    let (status, _) = send(routes, get_usage(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
