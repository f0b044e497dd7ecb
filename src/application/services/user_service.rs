//! User Service
//!
//! Handles user profile operations, password changes and follows.

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use super::auth_service::{hash_password, verify_password, AuthError};
use crate::domain::{
    DirectoryRepository, FileKind, FollowRepository, ProfileUpdate, Toggle, UserProfile,
    UserRepository, UserSummary,
};
use crate::infrastructure::media::{discard_uploads, MediaError, MediaFolder, MediaStore, UploadFile};
use crate::shared::error::AppError;
use crate::shared::validation::first_error;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Public profile with counters
    async fn profile(&self, user_id: i64) -> Result<UserProfile, UserError>;

    /// Replace avatar and directory scoping, optionally renaming
    async fn update_profile(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> Result<UserProfile, UserError>;

    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserError>;

    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError>;

    /// Follow `target_id`, or unfollow if already following
    async fn toggle_follow(&self, actor_id: i64, target_id: i64) -> Result<Toggle, UserError>;
}

/// Profile update, already parsed from the multipart form. Name limits
/// match registration.
#[derive(Debug, Clone, Validate)]
pub struct UpdateProfileInput {
    pub avatar: UploadFile,
    pub university_id: i64,
    pub career_id: i64,

    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,

    #[validate(length(max = 100, message = "Account name must be at most 100 characters"))]
    pub account_name: Option<String>,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    InvalidProfile(String),

    #[error("Avatar must be an image")]
    AvatarNotImage,

    #[error("Career does not belong to the selected university")]
    InvalidScope,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("Upload failed: {0}")]
    Upload(#[from] MediaError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<AuthError> for UserError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Repository(e) => UserError::Repository(e),
            other => UserError::Internal(other.to_string()),
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U, F, D>
where
    U: UserRepository,
    F: FollowRepository,
    D: DirectoryRepository,
{
    user_repo: Arc<U>,
    follow_repo: Arc<F>,
    directory_repo: Arc<D>,
    media: Arc<dyn MediaStore>,
}

impl<U, F, D> UserServiceImpl<U, F, D>
where
    U: UserRepository,
    F: FollowRepository,
    D: DirectoryRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        follow_repo: Arc<F>,
        directory_repo: Arc<D>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            user_repo,
            follow_repo,
            directory_repo,
            media,
        }
    }
}

#[async_trait]
impl<U, F, D> UserService for UserServiceImpl<U, F, D>
where
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
    D: DirectoryRepository + 'static,
{
    async fn profile(&self, user_id: i64) -> Result<UserProfile, UserError> {
        self.user_repo
            .find_profile(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> Result<UserProfile, UserError> {
        // Blank names mean "keep the current one".
        let input = UpdateProfileInput {
            username: input.username.filter(|u| !u.trim().is_empty()),
            account_name: input.account_name.filter(|n| !n.trim().is_empty()),
            ..input
        };
        input
            .validate()
            .map_err(|e| UserError::InvalidProfile(first_error(&e)))?;

        if !FileKind::from_file_name(&input.avatar.file_name).is_image() {
            return Err(UserError::AvatarNotImage);
        }

        let career = self.directory_repo.find_career(input.career_id).await?;
        if !career.is_some_and(|c| c.university_id == input.university_id) {
            return Err(UserError::InvalidScope);
        }

        let stored = self.media.upload(MediaFolder::Avatars, input.avatar).await?;

        let update = ProfileUpdate {
            avatar_url: stored.url.clone(),
            university_id: input.university_id,
            career_id: input.career_id,
            username: input.username,
            account_name: input.account_name,
        };

        if let Err(e) = self.user_repo.update_profile(user_id, update).await {
            discard_uploads(self.media.as_ref(), std::slice::from_ref(&stored)).await;
            return Err(e.into());
        }

        tracing::info!(user_id, "Profile updated");
        self.profile(user_id).await
    }

    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(UserError::WrongPassword);
        }

        let password_hash = hash_password(new_password)?;
        self.user_repo.update_password(user_id, &password_hash).await?;

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError> {
        Ok(self.follow_repo.followers_of(user_id).await?)
    }

    async fn toggle_follow(&self, actor_id: i64, target_id: i64) -> Result<Toggle, UserError> {
        if actor_id == target_id {
            return Err(UserError::SelfFollow);
        }
        if self.user_repo.find_by_id(target_id).await?.is_none() {
            return Err(UserError::NotFound);
        }

        Ok(self.follow_repo.toggle(actor_id, target_id).await?)
    }
}
