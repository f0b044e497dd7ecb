use async_trait::async_trait;

use super::user::UserSummary;
use crate::domain::value_objects::Toggle;
use crate::shared::error::AppError;

/// Directed follower graph stored in `follows`.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Follow `followed_id`, or unfollow if the edge already exists.
    async fn toggle(&self, follower_id: i64, followed_id: i64) -> Result<Toggle, AppError>;

    /// Users following `user_id`, most recent first.
    async fn followers_of(&self, user_id: i64) -> Result<Vec<UserSummary>, AppError>;
}
