//! Feed post API tests that fail before reaching the database

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use crate::common::{error_message, TestApp, TEST_MAX_BODY};

#[tokio::test]
async fn test_malformed_post_id_is_bad_request() {
    let app = TestApp::new();
    let response = app.get("/posts/abc").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid post id");
}

#[tokio::test]
async fn test_search_rejects_malformed_career() {
    let app = TestApp::new();
    let response = app.get("/posts/search?q=parcial&career=xyz").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid career id");
}

#[tokio::test]
async fn test_create_post_requires_token() {
    let app = TestApp::new();
    let response = app.post_json("/posts", "{}").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_post_requires_multipart() {
    let app = TestApp::new();
    let token = app.token(1);
    let response = app
        .post_json_auth("/posts", &json!({ "content": "hola" }).to_string(), &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_post_requires_career() {
    let app = TestApp::new();
    let token = app.token(1);
    let response = app
        .multipart_auth("POST", "/posts", &[("content", "hola")], &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "career_id is required");
}

#[tokio::test]
async fn test_create_post_rejects_malformed_tag_ids() {
    let app = TestApp::new();
    let token = app.token(1);
    let response = app
        .multipart_auth(
            "POST",
            "/posts",
            &[("content", "hola"), ("career_id", "2"), ("tag_ids[]", "1,dos")],
            &token,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid tag id");
}

#[tokio::test]
async fn test_update_post_rejects_empty_content() {
    let app = TestApp::new();
    let token = app.token(1);
    let response = app
        .send(
            Request::put("/posts/3")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(json!({ "content": "" }).to_string()))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_rejects_empty_content() {
    let app = TestApp::new();
    let token = app.token(1);
    let response = app
        .post_json_auth("/posts/3/comments", &json!({ "content": "" }).to_string(), &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = TestApp::new();
    let token = app.token(1);
    let content = "a".repeat(TEST_MAX_BODY + 1);
    let response = app
        .multipart_auth(
            "POST",
            "/posts",
            &[("career_id", "2"), ("content", &content)],
            &token,
        )
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
