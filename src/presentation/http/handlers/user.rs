//! User Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};

use super::post::post_service;
use crate::application::dto::request::{ChangePasswordRequest, PageQuery};
use crate::application::dto::response::{
    FollowResponse, MessageResponse, PostPageResponse, ProfileResponse, ProfileView,
    UserSummaryView,
};
use crate::application::services::{
    PostService, UpdateProfileInput, UserError, UserService, UserServiceImpl,
};
use crate::domain::PageRequest;
use crate::infrastructure::repositories::{
    PgDirectoryRepository, PgFollowRepository, PgUserRepository,
};
use crate::presentation::http::extractors::{FormData, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn user_service(
    state: &AppState,
) -> UserServiceImpl<PgUserRepository, PgFollowRepository, PgDirectoryRepository> {
    UserServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgFollowRepository::new(state.db.clone())),
        Arc::new(PgDirectoryRepository::new(state.db.clone())),
        state.media.clone(),
    )
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => AppError::NotFound(e.to_string()),
            UserError::InvalidProfile(msg) => AppError::Validation(msg),
            UserError::AvatarNotImage
            | UserError::InvalidScope
            | UserError::WrongPassword
            | UserError::SelfFollow => AppError::BadRequest(e.to_string()),
            UserError::Upload(e) => AppError::Upstream(e.to_string()),
            UserError::Internal(msg) => AppError::Internal(msg),
            UserError::Repository(e) => e,
        }
    }
}

/// Public profile, without email
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = parse_id(&user_id, "user id")?;
    let profile = user_service(&state).profile(user_id).await?;
    Ok(Json(ProfileResponse {
        message: None,
        user: ProfileView::from_profile(profile, false),
    }))
}

pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostPageResponse>, AppError> {
    let user_id = parse_id(&user_id, "user id")?;
    let page = PageRequest::from_query(
        query.page.as_deref(),
        state.settings.pagination.user_page_size,
    );
    let posts = post_service(&state).list_by_author(user_id, page).await?;
    Ok(Json(posts.into()))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = user_service(&state).profile(auth.user_id).await?;
    Ok(Json(ProfileResponse {
        message: None,
        user: ProfileView::from_profile(profile, true),
    }))
}

/// Multipart: `avatar`, `university_id`, `career_id`, optional `username`
/// and `account_name`.
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut form: FormData,
) -> Result<Json<ProfileResponse>, AppError> {
    let university_id = form.id("university_id")?;
    let career_id = form.id("career_id")?;
    let username = form.text("username").map(String::from);
    let account_name = form.text("account_name").map(String::from);
    let avatar = form
        .take_file("avatar")
        .ok_or_else(|| AppError::BadRequest("avatar is required".into()))?;

    let profile = user_service(&state)
        .update_profile(
            auth.user_id,
            UpdateProfileInput {
                avatar,
                university_id,
                career_id,
                username,
                account_name,
            },
        )
        .await?;

    Ok(Json(ProfileResponse {
        message: Some("Profile updated successfully".into()),
        user: ProfileView::from_profile(profile, true),
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    user_service(&state)
        .change_password(auth.user_id, &body.current_password, &body.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Bare array of users following the caller
pub async fn get_followers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserSummaryView>>, AppError> {
    let followers = user_service(&state).followers(auth.user_id).await?;
    Ok(Json(followers.into_iter().map(Into::into).collect()))
}

pub async fn toggle_follow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<FollowResponse>, AppError> {
    let user_id = parse_id(&user_id, "user id")?;
    let outcome = user_service(&state)
        .toggle_follow(auth.user_id, user_id)
        .await?;

    let message = if outcome.is_added() {
        "User followed"
    } else {
        "User unfollowed"
    };
    Ok(Json(FollowResponse {
        message: message.into(),
        following: outcome.is_added(),
    }))
}
