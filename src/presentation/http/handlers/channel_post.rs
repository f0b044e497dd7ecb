//! Channel Post Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::application::dto::request::{ChannelPostRequest, CommentRequest};
use crate::application::dto::response::{
    ChannelPostListResponse, ChannelPostResponse, CommentResponse, LikeResponse, MessageResponse,
};
use crate::application::services::{
    ChannelPostError, ChannelPostService, ChannelPostServiceImpl, CreateChannelPostInput,
};
use crate::infrastructure::repositories::{PgChannelPostRepository, PgChannelRepository};
use crate::presentation::http::extractors::{JsonOrForm, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn channel_post_service(
    state: &AppState,
) -> ChannelPostServiceImpl<PgChannelRepository, PgChannelPostRepository> {
    ChannelPostServiceImpl::new(
        Arc::new(PgChannelRepository::new(state.db.clone())),
        Arc::new(PgChannelPostRepository::new(state.db.clone())),
        state.media.clone(),
    )
}

impl From<ChannelPostError> for AppError {
    fn from(e: ChannelPostError) -> Self {
        match e {
            ChannelPostError::NotFound => AppError::NotFound(e.to_string()),
            ChannelPostError::NotMember | ChannelPostError::NotAllowed => {
                AppError::Forbidden(e.to_string())
            }
            ChannelPostError::EmptyPost | ChannelPostError::EmptyComment => {
                AppError::BadRequest(e.to_string())
            }
            ChannelPostError::Upload(e) => AppError::Upstream(e.to_string()),
            ChannelPostError::Repository(e) => e,
        }
    }
}

/// JSON `{content, tags}` or multipart `content`, `tags`, `files[]`
pub async fn create_channel_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<String>,
    body: JsonOrForm<ChannelPostRequest>,
) -> Result<(StatusCode, Json<ChannelPostResponse>), AppError> {
    let channel_id = parse_id(&channel_id, "channel id")?;

    let (content, tags, files) = match body {
        JsonOrForm::Json(body) => (body.content, body.tags, Vec::new()),
        JsonOrForm::Form(mut form) => (
            form.text("content").unwrap_or_default().to_string(),
            form.values(&["tags", "tags[]"]),
            form.take_files(&["files[]", "files"]),
        ),
    };

    let post = channel_post_service(&state)
        .create(CreateChannelPostInput {
            channel_id,
            user_id: auth.user_id,
            content,
            tags,
            files,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ChannelPostResponse {
            message: "Post created successfully".into(),
            post: post.into(),
        }),
    ))
}

pub async fn list_channel_posts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> Result<Json<ChannelPostListResponse>, AppError> {
    let channel_id = parse_id(&channel_id, "channel id")?;
    let posts = channel_post_service(&state)
        .list(channel_id, auth.user_id)
        .await?;
    Ok(Json(ChannelPostListResponse {
        posts: posts.into_iter().map(Into::into).collect(),
    }))
}

pub async fn add_channel_post_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    let comment = channel_post_service(&state)
        .add_comment(post_id, auth.user_id, &body.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            message: "Comment added successfully".into(),
            comment: comment.into(),
        }),
    ))
}

/// Toggle the caller's like
pub async fn like_channel_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    let outcome = channel_post_service(&state)
        .toggle_like(post_id, auth.user_id)
        .await?;
    let message = if outcome.is_added() { "Like added" } else { "Like removed" };
    Ok(Json(LikeResponse {
        message: message.into(),
        liked: outcome.is_added(),
    }))
}

pub async fn delete_channel_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    channel_post_service(&state)
        .delete(post_id, auth.user_id)
        .await?;
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}
