//! Channel API tests that fail before reaching the database

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{error_message, TestApp};

#[tokio::test]
async fn test_channels_require_auth() {
    let app = TestApp::new();

    assert_eq!(app.get("/channels").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get("/channels/invitations").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.get("/channels/1/posts").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_channel_validates_name_and_scope() {
    let app = TestApp::new();
    let token = app.token(1);

    let body = json!({ "name": "", "university_id": 1, "career_id": 2 });
    let response = app.post_json_auth("/channels", &body.to_string(), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("name"));

    let body = json!({ "name": "Parciales", "university_id": 0, "career_id": 2 });
    let response = app.post_json_auth("/channels", &body.to_string(), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_channel_ids_are_bad_requests() {
    let app = TestApp::new();
    let token = app.token(1);

    let response = app.get_auth("/channels/general", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid channel id");

    let response = app
        .post_json_auth(
            "/channels/invitations/x",
            &json!({ "action": "accept" }).to_string(),
            &token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid invitation id");
}

#[tokio::test]
async fn test_invite_requires_user() {
    let app = TestApp::new();
    let token = app.token(1);
    let response = app
        .post_json_auth("/channels/1/invite", &json!({}).to_string(), &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_channel_post_json_requires_content() {
    let app = TestApp::new();
    let token = app.token(1);
    let response = app
        .post_json_auth(
            "/channels/1/posts",
            &json!({ "content": "", "tags": ["Apuntes"] }).to_string(),
            &token,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_channel_post_routes_reject_malformed_ids() {
    let app = TestApp::new();
    let token = app.token(1);

    let response = app
        .post_json_auth("/channels/posts/abc/like", "{}", &token)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid post id");
}
