//! Channel Post Service
//!
//! Posts inside a channel. Every operation requires channel membership.

use std::sync::Arc;

use async_trait::async_trait;

use super::uploads::upload_all;
use crate::domain::services::ChannelPolicy;
use crate::domain::{
    ChannelMember, ChannelPost, ChannelPostDetails, ChannelPostRepository, ChannelRepository,
    CommentWithAuthor, NewChannelPost, Toggle,
};
use crate::infrastructure::media::{discard_uploads, MediaError, MediaFolder, MediaStore, UploadFile};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Channel post service trait
#[async_trait]
pub trait ChannelPostService: Send + Sync {
    async fn create(&self, input: CreateChannelPostInput)
        -> Result<ChannelPostDetails, ChannelPostError>;

    async fn list(
        &self,
        channel_id: i64,
        actor_id: i64,
    ) -> Result<Vec<ChannelPostDetails>, ChannelPostError>;

    async fn add_comment(
        &self,
        post_id: i64,
        actor_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, ChannelPostError>;

    async fn toggle_like(&self, post_id: i64, actor_id: i64) -> Result<Toggle, ChannelPostError>;

    /// Authors delete their own posts; channel admins delete any
    async fn delete(&self, post_id: i64, actor_id: i64) -> Result<(), ChannelPostError>;
}

#[derive(Debug, Clone)]
pub struct CreateChannelPostInput {
    pub channel_id: i64,
    pub user_id: i64,
    pub content: String,
    pub tags: Vec<String>,
    pub files: Vec<UploadFile>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelPostError {
    #[error("Post not found")]
    NotFound,

    #[error("You are not a member of this channel")]
    NotMember,

    #[error("You are not allowed to delete this post")]
    NotAllowed,

    #[error("Post content is required")]
    EmptyPost,

    #[error("Comment content is required")]
    EmptyComment,

    #[error("Upload failed: {0}")]
    Upload(#[from] MediaError),

    #[error(transparent)]
    Repository(#[from] AppError),
}

pub struct ChannelPostServiceImpl<C, P>
where
    C: ChannelRepository,
    P: ChannelPostRepository,
{
    channel_repo: Arc<C>,
    post_repo: Arc<P>,
    media: Arc<dyn MediaStore>,
}

impl<C, P> ChannelPostServiceImpl<C, P>
where
    C: ChannelRepository,
    P: ChannelPostRepository,
{
    pub fn new(channel_repo: Arc<C>, post_repo: Arc<P>, media: Arc<dyn MediaStore>) -> Self {
        Self {
            channel_repo,
            post_repo,
            media,
        }
    }

    async fn membership(
        &self,
        channel_id: i64,
        actor_id: i64,
    ) -> Result<ChannelMember, ChannelPostError> {
        let member = self.channel_repo.find_member(channel_id, actor_id).await?;
        if !ChannelPolicy::can_participate(member.as_ref()) {
            return Err(ChannelPostError::NotMember);
        }
        member.ok_or(ChannelPostError::NotMember)
    }

    /// Load a post and check the caller belongs to its channel.
    async fn accessible(
        &self,
        post_id: i64,
        actor_id: i64,
    ) -> Result<(ChannelPost, ChannelMember), ChannelPostError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(ChannelPostError::NotFound)?;
        let member = self.membership(post.channel_id, actor_id).await?;
        Ok((post, member))
    }
}

#[async_trait]
impl<C, P> ChannelPostService for ChannelPostServiceImpl<C, P>
where
    C: ChannelRepository + 'static,
    P: ChannelPostRepository + 'static,
{
    async fn create(
        &self,
        input: CreateChannelPostInput,
    ) -> Result<ChannelPostDetails, ChannelPostError> {
        self.membership(input.channel_id, input.user_id).await?;

        if input.content.trim().is_empty() && input.files.is_empty() {
            return Err(ChannelPostError::EmptyPost);
        }

        let batch =
            upload_all(self.media.as_ref(), MediaFolder::ChannelPostFiles, input.files).await?;

        let new_post = NewChannelPost {
            channel_id: input.channel_id,
            user_id: input.user_id,
            content: input.content,
            tags: input.tags,
        };

        let post = match self.post_repo.create(new_post, batch.attachments).await {
            Ok(post) => post,
            Err(e) => {
                discard_uploads(self.media.as_ref(), &batch.stored).await;
                return Err(e.into());
            }
        };

        metrics::record_post_created("channel");
        tracing::info!(post_id = post.id, channel_id = post.channel_id, "Channel post created");

        self.post_repo
            .find_details(post.id)
            .await?
            .ok_or(ChannelPostError::NotFound)
    }

    async fn list(
        &self,
        channel_id: i64,
        actor_id: i64,
    ) -> Result<Vec<ChannelPostDetails>, ChannelPostError> {
        self.membership(channel_id, actor_id).await?;
        Ok(self.post_repo.list_for_channel(channel_id).await?)
    }

    async fn add_comment(
        &self,
        post_id: i64,
        actor_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, ChannelPostError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChannelPostError::EmptyComment);
        }
        self.accessible(post_id, actor_id).await?;
        Ok(self.post_repo.add_comment(post_id, actor_id, content).await?)
    }

    async fn toggle_like(&self, post_id: i64, actor_id: i64) -> Result<Toggle, ChannelPostError> {
        self.accessible(post_id, actor_id).await?;
        let outcome = self.post_repo.toggle_like(post_id, actor_id).await?;
        metrics::record_like_toggle("channel", outcome.is_added());
        Ok(outcome)
    }

    async fn delete(&self, post_id: i64, actor_id: i64) -> Result<(), ChannelPostError> {
        let (post, member) = self.accessible(post_id, actor_id).await?;
        if !ChannelPolicy::can_delete_post(&post, actor_id, Some(&member)) {
            return Err(ChannelPostError::NotAllowed);
        }

        self.post_repo.delete(post_id).await?;
        tracing::info!(post_id, channel_id = post.channel_id, actor_id, "Channel post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::media::MockMediaStore;
    use crate::test_support::MemoryStore;

    type Service = ChannelPostServiceImpl<MemoryStore, MemoryStore>;

    fn service(store: &Arc<MemoryStore>) -> Service {
        ChannelPostServiceImpl::new(store.clone(), store.clone(), Arc::new(MockMediaStore::new()))
    }

    fn input(channel_id: i64, user_id: i64, content: &str) -> CreateChannelPostInput {
        CreateChannelPostInput {
            channel_id,
            user_id,
            content: content.into(),
            tags: vec!["Apuntes".into()],
            files: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_members_post_and_list() {
        let store = Arc::new(MemoryStore::default());
        let ana = store.seed_user("ana").await;
        let beto = store.seed_user("beto").await;
        let channel_id = store.seed_channel(ana.id, &[]).await;
        let posts = service(&store);

        let created = posts.create(input(channel_id, ana.id, "hola canal")).await.unwrap();
        assert_eq!(created.author.username, "ana");
        assert_eq!(created.post.tags, vec!["Apuntes".to_string()]);

        assert_eq!(posts.list(channel_id, ana.id).await.unwrap().len(), 1);
        assert!(matches!(
            posts.list(channel_id, beto.id).await,
            Err(ChannelPostError::NotMember)
        ));
        assert!(matches!(
            posts.create(input(channel_id, beto.id, "intruso")).await,
            Err(ChannelPostError::NotMember)
        ));
    }

    #[tokio::test]
    async fn test_comment_and_like_require_membership() {
        let store = Arc::new(MemoryStore::default());
        let ana = store.seed_user("ana").await;
        let beto = store.seed_user("beto").await;
        let channel_id = store.seed_channel(ana.id, &[]).await;
        let posts = service(&store);
        let post_id = posts.create(input(channel_id, ana.id, "hola")).await.unwrap().post.id;

        assert!(matches!(
            posts.add_comment(post_id, beto.id, "hola").await,
            Err(ChannelPostError::NotMember)
        ));
        assert!(matches!(
            posts.toggle_like(post_id, beto.id).await,
            Err(ChannelPostError::NotMember)
        ));

        assert_eq!(posts.toggle_like(post_id, ana.id).await.unwrap(), Toggle::Added);
        assert_eq!(posts.toggle_like(post_id, ana.id).await.unwrap(), Toggle::Removed);

        let comment = posts.add_comment(post_id, ana.id, "primero").await.unwrap();
        assert_eq!(comment.comment.post_id, post_id);
    }

    #[tokio::test]
    async fn test_delete_by_author_or_admin_only() {
        let store = Arc::new(MemoryStore::default());
        let ana = store.seed_user("ana").await;
        let beto = store.seed_user("beto").await;
        let caro = store.seed_user("caro").await;
        let channel_id = store.seed_channel(ana.id, &[beto.id, caro.id]).await;
        let posts = service(&store);

        let by_beto = posts.create(input(channel_id, beto.id, "de beto")).await.unwrap().post.id;
        assert!(matches!(
            posts.delete(by_beto, caro.id).await,
            Err(ChannelPostError::NotAllowed)
        ));
        // Admin may delete anyone's post.
        posts.delete(by_beto, ana.id).await.unwrap();

        let by_caro = posts.create(input(channel_id, caro.id, "de caro")).await.unwrap().post.id;
        posts.delete(by_caro, caro.id).await.unwrap();

        assert!(matches!(
            posts.delete(by_caro, caro.id).await,
            Err(ChannelPostError::NotFound)
        ));
    }
}
