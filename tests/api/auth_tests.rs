//! Authentication API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{error_message, TestApp};

#[tokio::test]
async fn test_register_with_invalid_email_fails() {
    let app = TestApp::new();
    let body = json!({
        "username": "ana",
        "email": "not-an-email",
        "password": "secreto123"
    });

    let response = app.post_json("/auth/register", &body.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("email"));
}

#[tokio::test]
async fn test_register_with_short_password_fails() {
    let app = TestApp::new();
    let body = json!({
        "username": "ana",
        "email": "ana@example.com",
        "password": "123"
    });

    let response = app.post_json("/auth/register", &body.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("password"));
}

#[tokio::test]
async fn test_register_with_malformed_json_fails() {
    let app = TestApp::new();
    let response = app.post_json("/auth/register", "{\"username\":").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_needs_email_or_username() {
    let app = TestApp::new();
    let response = app
        .post_json("/auth/login", &json!({ "password": "secreto123" }).to_string())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Email or username is required");
}

#[tokio::test]
async fn test_reset_password_validates_new_password() {
    let app = TestApp::new();
    let body = json!({ "token": "abc", "password": "123" });

    let response = app.post_json("/auth/reset-password", &body.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_password_validates_email() {
    let app = TestApp::new();
    let response = app
        .post_json("/auth/forgot-password", &json!({ "email": "nope" }).to_string())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_endpoint_requires_auth() {
    let app = TestApp::new();
    let response = app.get("/users/me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Missing authorization header");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new();
    let response = app.get_auth("/channels", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Invalid token");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new();
    let token = app.expired_token(1);
    let response = app.get_auth("/users/followers", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Token expired");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = TestApp::new();
    let mut jwt = app.settings.jwt.clone();
    jwt.secret = "another-secret-that-is-also-long-enough".into();
    let token = red_apuntes::application::services::issue_token(1, &jwt).unwrap();

    let response = app.get_auth("/channels/invitations", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
