//! Channel invitations.
//!
//! Maps to the `channel_invitations` table. A partial unique index keeps at
//! most one `pending` row per (channel, invitee).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::channel::Channel;
use super::user::UserSummary;
use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    /// Convert from database string representation.
    pub fn from_db(s: &str) -> Self {
        match s {
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the invitee decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Reject,
}

impl InvitationAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(Self::Accept),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelInvitation {
    pub id: i64,
    pub channel_id: i64,
    pub invited_by: i64,
    pub invited_user: i64,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChannelInvitation {
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}

/// A pending invitation with the channel and inviter it refers to.
#[derive(Debug, Clone)]
pub struct InvitationWithContext {
    pub invitation: ChannelInvitation,
    pub channel: Channel,
    pub inviter: UserSummary,
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Insert a pending invitation. A concurrent duplicate yields `AppError::BadRequest`.
    async fn create(
        &self,
        channel_id: i64,
        invited_by: i64,
        invited_user: i64,
    ) -> Result<ChannelInvitation, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError>;

    async fn has_pending(&self, channel_id: i64, invited_user: i64) -> Result<bool, AppError>;

    /// Add the invitee as a member and mark the invitation accepted, in one
    /// transaction. `None` when the invitation was no longer pending.
    async fn accept(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError>;

    /// Mark a pending invitation rejected. `None` when it was no longer pending.
    async fn reject(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError>;

    async fn list_pending_for(&self, user_id: i64) -> Result<Vec<InvitationWithContext>, AppError>;
}
