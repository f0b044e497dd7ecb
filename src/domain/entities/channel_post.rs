//! Posts inside a channel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::post::{Attachment, CommentWithAuthor, LikeWithAuthor, NewAttachment};
use super::user::UserSummary;
use crate::domain::value_objects::Toggle;
use crate::shared::error::AppError;

/// Maps to the `channel_posts` table.
#[derive(Debug, Clone)]
pub struct ChannelPost {
    pub id: i64,
    pub channel_id: i64,
    pub user_id: i64,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChannelPost {
    pub channel_id: i64,
    pub user_id: i64,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChannelPostDetails {
    pub post: ChannelPost,
    pub author: UserSummary,
    pub comments: Vec<CommentWithAuthor>,
    pub likes: Vec<LikeWithAuthor>,
    pub files: Vec<Attachment>,
}

#[async_trait]
pub trait ChannelPostRepository: Send + Sync {
    /// Insert the post and its attachments in one transaction.
    async fn create(
        &self,
        post: NewChannelPost,
        files: Vec<NewAttachment>,
    ) -> Result<ChannelPost, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelPost>, AppError>;

    async fn find_details(&self, id: i64) -> Result<Option<ChannelPostDetails>, AppError>;

    /// Newest first.
    async fn list_for_channel(&self, channel_id: i64) -> Result<Vec<ChannelPostDetails>, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Toggle, AppError>;

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, AppError>;
}
