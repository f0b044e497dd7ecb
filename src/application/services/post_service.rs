//! Post Service
//!
//! The public feed: listing, search, authoring with attachments, likes
//! and comments.

use std::sync::Arc;

use async_trait::async_trait;

use super::uploads::upload_all;
use crate::domain::{
    CommentWithAuthor, DirectoryRepository, NewPost, Page, PageRequest, Post, PostDetails,
    PostRepository, PostSearch, PostTags, PostUpdate, TagRepository, Toggle,
};
use crate::infrastructure::media::{discard_uploads, MediaError, MediaFolder, MediaStore, UploadFile};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Post service trait
#[async_trait]
pub trait PostService: Send + Sync {
    /// One page of the feed, newest first
    async fn list_feed(&self, page: PageRequest) -> Result<Page<PostDetails>, PostError>;

    /// One page of a single author's posts
    async fn list_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, PostError>;

    async fn get(&self, post_id: i64) -> Result<PostDetails, PostError>;

    /// Upload attachments, then write post, files and tag links together
    async fn create(&self, input: CreatePostInput) -> Result<Post, PostError>;

    /// Author only. New tag ids are checked like on create.
    async fn update(
        &self,
        post_id: i64,
        actor_id: i64,
        input: UpdatePostInput,
    ) -> Result<PostDetails, PostError>;

    async fn delete(&self, post_id: i64, actor_id: i64) -> Result<(), PostError>;

    async fn search(&self, filter: PostSearch) -> Result<Vec<PostDetails>, PostError>;

    async fn toggle_like(&self, post_id: i64, actor_id: i64) -> Result<Toggle, PostError>;

    /// Returns whether a like was removed
    async fn unlike(&self, post_id: i64, actor_id: i64) -> Result<bool, PostError>;

    async fn add_comment(
        &self,
        post_id: i64,
        actor_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, PostError>;
}

/// Create post request, already parsed from the multipart form
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub user_id: i64,
    pub content: String,
    pub career_id: i64,
    pub tag_ids: Vec<i64>,
    pub files: Vec<UploadFile>,
}

/// Partial post update. `tag_ids: Some(vec![])` clears the tags.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub content: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Only the author can modify this post")]
    NotAuthor,

    #[error("Invalid career")]
    InvalidCareer,

    #[error("Invalid tag selection")]
    InvalidTags,

    #[error("Post content is required")]
    EmptyPost,

    #[error("Comment content is required")]
    EmptyComment,

    #[error("Upload failed: {0}")]
    Upload(#[from] MediaError),

    #[error(transparent)]
    Repository(#[from] AppError),
}

/// PostService implementation
pub struct PostServiceImpl<P, D, T>
where
    P: PostRepository,
    D: DirectoryRepository,
    T: TagRepository,
{
    post_repo: Arc<P>,
    directory_repo: Arc<D>,
    tag_repo: Arc<T>,
    media: Arc<dyn MediaStore>,
}

impl<P, D, T> PostServiceImpl<P, D, T>
where
    P: PostRepository,
    D: DirectoryRepository,
    T: TagRepository,
{
    pub fn new(
        post_repo: Arc<P>,
        directory_repo: Arc<D>,
        tag_repo: Arc<T>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            post_repo,
            directory_repo,
            tag_repo,
            media,
        }
    }

    async fn existing(&self, post_id: i64) -> Result<Post, PostError> {
        self.post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)
    }

    async fn owned(&self, post_id: i64, actor_id: i64) -> Result<Post, PostError> {
        let post = self.existing(post_id).await?;
        if !post.is_authored_by(actor_id) {
            return Err(PostError::NotAuthor);
        }
        Ok(post)
    }

    async fn page(
        &self,
        author: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, PostError> {
        let total = self.post_repo.count(author).await?;
        let items = self
            .post_repo
            .list(author, page.limit(), page.offset())
            .await?;
        Ok(Page::new(items, page, total))
    }

    /// Resolve tag ids to names, keeping the requested order.
    async fn tag_names(&self, tag_ids: &[i64]) -> Result<Vec<String>, PostError> {
        let mut ids = tag_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tags = self.tag_repo.find_by_ids(&ids).await?;
        if tags.len() != ids.len() {
            return Err(PostError::InvalidTags);
        }

        let mut names = Vec::with_capacity(ids.len());
        for id in tag_ids {
            if let Some(tag) = tags.iter().find(|t| t.id == *id) {
                if !names.contains(&tag.name) {
                    names.push(tag.name.clone());
                }
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl<P, D, T> PostService for PostServiceImpl<P, D, T>
where
    P: PostRepository + 'static,
    D: DirectoryRepository + 'static,
    T: TagRepository + 'static,
{
    async fn list_feed(&self, page: PageRequest) -> Result<Page<PostDetails>, PostError> {
        self.page(None, page).await
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, PostError> {
        self.page(Some(author_id), page).await
    }

    async fn get(&self, post_id: i64) -> Result<PostDetails, PostError> {
        self.post_repo
            .find_details(post_id)
            .await?
            .ok_or(PostError::NotFound)
    }

    async fn create(&self, input: CreatePostInput) -> Result<Post, PostError> {
        if input.content.trim().is_empty() && input.files.is_empty() {
            return Err(PostError::EmptyPost);
        }

        let career = self
            .directory_repo
            .find_career(input.career_id)
            .await?
            .ok_or(PostError::InvalidCareer)?;
        let tags = self.tag_names(&input.tag_ids).await?;

        let batch = upload_all(self.media.as_ref(), MediaFolder::PostFiles, input.files).await?;

        let new_post = NewPost {
            user_id: input.user_id,
            content: input.content,
            tag_ids: input.tag_ids,
            tags,
            university_id: career.university_id,
            career_id: career.id,
        };

        match self.post_repo.create(new_post, batch.attachments).await {
            Ok(post) => {
                metrics::record_post_created("feed");
                tracing::info!(post_id = post.id, user_id = post.user_id, "Post created");
                Ok(post)
            }
            Err(e) => {
                discard_uploads(self.media.as_ref(), &batch.stored).await;
                Err(e.into())
            }
        }
    }

    async fn update(
        &self,
        post_id: i64,
        actor_id: i64,
        input: UpdatePostInput,
    ) -> Result<PostDetails, PostError> {
        self.owned(post_id, actor_id).await?;

        if input.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(PostError::EmptyPost);
        }

        let tags = match input.tag_ids {
            Some(ids) => {
                let names = self.tag_names(&ids).await?;
                let mut ids = ids;
                ids.sort_unstable();
                ids.dedup();
                Some(PostTags { ids, names })
            }
            None => None,
        };

        let update = PostUpdate {
            content: input.content,
            tags,
        };
        self.post_repo.update(post_id, update).await?;
        tracing::info!(post_id, "Post updated");
        self.get(post_id).await
    }

    async fn delete(&self, post_id: i64, actor_id: i64) -> Result<(), PostError> {
        self.owned(post_id, actor_id).await?;
        self.post_repo.delete(post_id).await?;
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }

    async fn search(&self, filter: PostSearch) -> Result<Vec<PostDetails>, PostError> {
        Ok(self.post_repo.search(&filter).await?)
    }

    async fn toggle_like(&self, post_id: i64, actor_id: i64) -> Result<Toggle, PostError> {
        self.existing(post_id).await?;
        let outcome = self.post_repo.toggle_like(post_id, actor_id).await?;
        metrics::record_like_toggle("feed", outcome.is_added());
        Ok(outcome)
    }

    async fn unlike(&self, post_id: i64, actor_id: i64) -> Result<bool, PostError> {
        self.existing(post_id).await?;
        Ok(self.post_repo.remove_like(post_id, actor_id).await?)
    }

    async fn add_comment(
        &self,
        post_id: i64,
        actor_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, PostError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(PostError::EmptyComment);
        }
        self.existing(post_id).await?;
        Ok(self.post_repo.add_comment(post_id, actor_id, content).await?)
    }
}
