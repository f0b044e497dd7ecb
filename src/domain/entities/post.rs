//! Feed posts and their comments, likes and file attachments.
//!
//! `Comment`, `Like`, `Attachment` and their `*WithAuthor` views are shared
//! with channel posts; the two families live in separate tables but have the
//! same shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::user::UserSummary;
use crate::domain::value_objects::Toggle;
use crate::shared::error::AppError;

/// Maps to the `posts` table.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    /// Tag names in insertion order
    pub tags: Vec<String>,
    pub university_id: i64,
    pub career_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Like {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub liked_at: DateTime<Utc>,
}

/// A file stored on the media host and linked to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: i64,
    pub post_id: i64,
    pub file_url: String,
    pub file_type: String,
    pub file_name: String,
}

/// An uploaded file not yet linked to a post row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub file_url: String,
    pub file_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: UserSummary,
}

#[derive(Debug, Clone)]
pub struct LikeWithAuthor {
    pub like: Like,
    pub author: UserSummary,
}

/// A post with everything the feed renders.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: Post,
    pub author: UserSummary,
    pub university_name: Option<String>,
    pub career_name: Option<String>,
    pub comments: Vec<CommentWithAuthor>,
    pub likes: Vec<LikeWithAuthor>,
    pub files: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub content: String,
    pub tags: Vec<String>,
    pub tag_ids: Vec<i64>,
    pub university_id: i64,
    pub career_id: i64,
}

/// Resolved tag selection: `ids` become `post_tags` rows, `names` the
/// denormalized `posts.tags` array that search matches on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostTags {
    pub ids: Vec<i64>,
    pub names: Vec<String>,
}

/// Absent fields are left unchanged. `tags` replaces both tag stores at once.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub content: Option<String>,
    pub tags: Option<PostTags>,
}

/// Filters for `GET /posts/search`. Every filter is optional and they combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PostSearch {
    pub query: Option<String>,
    pub university_id: Option<i64>,
    pub career_id: Option<i64>,
    pub tags: Vec<String>,
}

impl PostSearch {
    /// Whether `post` satisfies every filter.
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(q) = &self.query {
            if !post.content.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if self.university_id.is_some_and(|id| id != post.university_id) {
            return false;
        }
        if self.career_id.is_some_and(|id| id != post.career_id) {
            return false;
        }
        self.tags.iter().all(|t| post.tags.contains(t))
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, AppError>;

    /// Newest first, ties broken by id descending. `author` narrows to one user.
    async fn list(
        &self,
        author: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostDetails>, AppError>;

    async fn count(&self, author: Option<i64>) -> Result<i64, AppError>;

    async fn search(&self, filter: &PostSearch) -> Result<Vec<PostDetails>, AppError>;

    /// Insert the post, its attachments and tag links in one transaction.
    async fn create(&self, post: NewPost, files: Vec<NewAttachment>) -> Result<Post, AppError>;

    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Remove the caller's like if present, otherwise add it.
    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Toggle, AppError>;

    /// Returns whether a like was removed.
    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool, AppError>;

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, AppError>;
}
