//! Integration tests for health check endpoints
//!
//! Tests the health check API routes to ensure proper responses
//! for liveness and readiness probes.

mod common;

use axum::http::{Method, StatusCode};
use axum::{body::Body, http::Request};
use tower::ServiceExt;

use common::{send, test_app};
use streamus_api::controllers::DEFAULT_BATCH_LIMIT;

#[tokio::test]
async fn test_root_endpoint() {
    let app = test_app(DEFAULT_BATCH_LIMIT);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert!(body_str.contains("Streamus"));
}

#[tokio::test]
async fn test_simple_health_check() {
    let app = test_app(DEFAULT_BATCH_LIMIT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app(DEFAULT_BATCH_LIMIT);

    let (status, json) = send(&app, Method::GET, "/health/live", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "alive");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_with_memory_store() {
    let app = test_app(DEFAULT_BATCH_LIMIT);

    let (status, json) = send(&app, Method::GET, "/health/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_health_returns_json_content_type() {
    let app = test_app(DEFAULT_BATCH_LIMIT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    assert!(content_type.is_some());
    assert!(content_type.unwrap().contains("application/json"));
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let app = test_app(DEFAULT_BATCH_LIMIT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
