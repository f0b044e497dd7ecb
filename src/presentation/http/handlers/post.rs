//! Feed Post Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::application::dto::request::{CommentRequest, PageQuery, SearchQuery, UpdatePostRequest};
use crate::application::dto::response::{
    CommentResponse, CreatedPostResponse, LikeResponse, MessageResponse, PostListResponse,
    PostPageResponse, PostResponse,
};
use crate::application::services::{CreatePostInput, PostError, PostService, PostServiceImpl};
use crate::domain::PageRequest;
use crate::infrastructure::repositories::{PgDirectoryRepository, PgPostRepository, PgTagRepository};
use crate::presentation::http::extractors::{FormData, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

type Service = PostServiceImpl<PgPostRepository, PgDirectoryRepository, PgTagRepository>;

pub(super) fn post_service(state: &AppState) -> Service {
    PostServiceImpl::new(
        Arc::new(PgPostRepository::new(state.db.clone())),
        Arc::new(PgDirectoryRepository::new(state.db.clone())),
        Arc::new(PgTagRepository::new(state.db.clone())),
        state.media.clone(),
    )
}

impl From<PostError> for AppError {
    fn from(e: PostError) -> Self {
        match e {
            PostError::NotFound => AppError::NotFound(e.to_string()),
            PostError::NotAuthor => AppError::Forbidden(e.to_string()),
            PostError::InvalidCareer
            | PostError::InvalidTags
            | PostError::EmptyPost
            | PostError::EmptyComment => AppError::BadRequest(e.to_string()),
            PostError::Upload(e) => AppError::Upstream(e.to_string()),
            PostError::Repository(e) => e,
        }
    }
}

/// `GET /posts?page=`
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostPageResponse>, AppError> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        state.settings.pagination.feed_page_size,
    );
    let posts = post_service(&state).list_feed(page).await?;
    Ok(Json(posts.into()))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    let post = post_service(&state).get(post_id).await?;
    Ok(Json(PostResponse { post: post.into() }))
}

/// `POST /posts` (multipart: content, career_id, tag_ids, files[])
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut form: FormData,
) -> Result<(StatusCode, Json<CreatedPostResponse>), AppError> {
    let career_id = form.id("career_id")?;
    let tag_ids = form
        .values(&["tag_ids", "tag_ids[]"])
        .iter()
        .map(|raw| parse_id(raw, "tag id"))
        .collect::<Result<Vec<_>, _>>()?;

    let input = CreatePostInput {
        user_id: auth.user_id,
        content: form.text("content").unwrap_or_default().to_string(),
        career_id,
        tag_ids,
        files: form.take_files(&["files[]", "files"]),
    };

    let post = post_service(&state).create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedPostResponse {
            message: "Post created successfully".into(),
            post_id: post.id,
        }),
    ))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    let post = post_service(&state)
        .update(post_id, auth.user_id, body.into())
        .await?;
    Ok(Json(PostResponse { post: post.into() }))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    post_service(&state).delete(post_id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// `GET /posts/search?q=&university=&career=&tags=a,b`
pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let posts = post_service(&state).search(query.into_filter()?).await?;
    Ok(Json(PostListResponse {
        posts: posts.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /posts/{id}/likes` toggles the caller's like
pub async fn like_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    let outcome = post_service(&state).toggle_like(post_id, auth.user_id).await?;
    let message = if outcome.is_added() { "Like added" } else { "Like removed" };
    Ok(Json(LikeResponse {
        message: message.into(),
        liked: outcome.is_added(),
    }))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    let removed = post_service(&state).unlike(post_id, auth.user_id).await?;
    let message = if removed { "Like removed" } else { "Post was not liked" };
    Ok(Json(LikeResponse {
        message: message.into(),
        liked: false,
    }))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let post_id = parse_id(&post_id, "post id")?;
    let comment = post_service(&state)
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
