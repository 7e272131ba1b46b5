//! Router-level probes without sockets
//!
//! Uses `tower::ServiceExt::oneshot` to drive the assembled router the way
//! a deployment health check would.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use xfform::backend::server::config::ServerConfig;
use xfform::backend::server::init::create_app;

#[tokio::test]
async fn test_health_reports_ok() {
    let app = create_app(ServerConfig::default());
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
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unknown_path_hits_the_static_fallback() {
    let mut config = ServerConfig::default();
    config.static_dir = "does-not-exist".to_string();
    let app = create_app(config);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/definitely-not-a-route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // With no asset to serve, the fallback answers 404 rather than panicking.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
