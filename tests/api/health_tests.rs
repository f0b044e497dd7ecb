//! Health, metrics and middleware tests

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use http_body_util::BodyExt;

use crate::common::{json_body, TestApp};

#[tokio::test]
async fn test_ping_returns_pong() {
    let app = TestApp::new();
    let response = app.get("/ping").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "pong");
}

#[tokio::test]
async fn test_health_and_liveness_do_not_need_database() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());

    let response = app.get("/health/live").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::new();
    let response = app.get("/health/ready").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_exposes_request_counters() {
    let app = TestApp::new();
    app.get("/ping").await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("red_apuntes_http_requests_total"));
    assert!(text.contains("path=\"/ping\""));
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = TestApp::new();

    for uri in ["/ping", "/does-not-exist"] {
        let response = app.get(uri).await;
        let headers = response.headers();
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        // Not production, so no HSTS.
        assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
    }
}

#[tokio::test]
async fn test_cors_preflight_for_configured_origin() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/posts")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    assert_eq!(app.get("/guilds").await.status(), StatusCode::NOT_FOUND);
}
