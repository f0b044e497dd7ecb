//! User and directory API tests that fail before reaching the database

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use crate::common::{error_message, TestApp};

#[tokio::test]
async fn test_malformed_user_id_is_bad_request() {
    let app = TestApp::new();

    let response = app.get("/users/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid user id");

    let response = app.get("/users/-4/posts").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_profile_requires_scope_and_avatar() {
    let app = TestApp::new();
    let token = app.token(1);

    let response = app
        .multipart_auth("PUT", "/users/me", &[("career_id", "2")], &token)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "university_id is required");

    let response = app
        .multipart_auth(
            "PUT",
            "/users/me",
            &[("university_id", "1"), ("career_id", "2")],
            &token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "avatar is required");
}

#[tokio::test]
async fn test_change_password_validates_new_password() {
    let app = TestApp::new();
    let token = app.token(1);
    let body = json!({ "current_password": "secreto123", "new_password": "123" });

    let response = app
        .send(
            Request::put("/users/me/password")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_follow_requires_auth() {
    let app = TestApp::new();
    let response = app.post_json("/users/2/follow", "{}").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_directory_rejects_malformed_ids() {
    let app = TestApp::new();

    let response = app.get("/universities/uba").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid university id");

    let response = app.get("/careers/0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_creating_universities_requires_auth() {
    let app = TestApp::new();
    let response = app
        .post_json("/universities", &json!({ "name": "UBA" }).to_string())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
