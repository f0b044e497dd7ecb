//! Channel entity, memberships and repository trait.
//!
//! Maps to the `channels` and `channel_members` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::directory::{Career, University};
use super::user::UserSummary;
use crate::shared::error::AppError;

/// A group space scoped to a university and career.
///
/// Maps to the `channels` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - name: VARCHAR(100) NOT NULL
/// - description: TEXT NOT NULL DEFAULT ''
/// - created_by: BIGINT NOT NULL (users.id)
/// - is_private: BOOLEAN NOT NULL
/// - university_id / career_id: BIGINT NOT NULL
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by: i64,
    pub is_private: bool,
    pub university_id: i64,
    pub career_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A user's membership in a channel. At most one per (channel, user).
#[derive(Debug, Clone)]
pub struct ChannelMember {
    pub id: i64,
    pub channel_id: i64,
    pub user_id: i64,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChannel {
    pub name: String,
    pub description: String,
    pub is_private: bool,
    pub university_id: i64,
    pub career_id: i64,
    pub created_by: i64,
}

#[derive(Debug, Clone)]
pub struct MemberWithUser {
    pub member: ChannelMember,
    pub user: UserSummary,
}

/// A channel with its creator, directory entries and members.
#[derive(Debug, Clone)]
pub struct ChannelDetails {
    pub channel: Channel,
    pub creator: UserSummary,
    pub university: Option<University>,
    pub career: Option<Career>,
    pub members: Vec<MemberWithUser>,
}

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Insert the channel and an admin membership for its creator in one transaction.
    async fn create_with_admin(&self, channel: NewChannel) -> Result<Channel, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Channel>, AppError>;

    async fn find_details(&self, id: i64) -> Result<Option<ChannelDetails>, AppError>;

    /// Channels the user belongs to, newest first.
    async fn list_for_member(&self, user_id: i64) -> Result<Vec<ChannelDetails>, AppError>;

    async fn find_member(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<Option<ChannelMember>, AppError>;

    async fn touch_last_seen(&self, channel_id: i64, user_id: i64) -> Result<(), AppError>;
}
