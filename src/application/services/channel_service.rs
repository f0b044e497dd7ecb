//! Channel Service
//!
//! Channels are private group spaces scoped to a university and career.
//! Access is membership based: creators become admins, admins invite,
//! invitees accept or reject.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::services::ChannelPolicy;
use crate::domain::{
    ChannelDetails, ChannelInvitation, ChannelRepository, DirectoryRepository, InvitationAction,
    InvitationRepository, InvitationWithContext, NewChannel, UserRepository,
};
use crate::shared::error::AppError;

/// Channel service trait
#[async_trait]
pub trait ChannelService: Send + Sync {
    /// Create a channel with the caller as its admin member
    async fn create(&self, actor_id: i64, input: CreateChannelInput)
        -> Result<ChannelDetails, ChannelError>;

    /// Channels the caller belongs to
    async fn list(&self, actor_id: i64) -> Result<Vec<ChannelDetails>, ChannelError>;

    /// Channel with members. Membership is checked before existence.
    async fn get(&self, channel_id: i64, actor_id: i64) -> Result<ChannelDetails, ChannelError>;

    async fn invite(
        &self,
        channel_id: i64,
        actor_id: i64,
        invited_user: i64,
    ) -> Result<ChannelInvitation, ChannelError>;

    /// Accept or reject an invitation addressed to the caller
    async fn handle_invitation(
        &self,
        invitation_id: i64,
        actor_id: i64,
        action: &str,
    ) -> Result<ChannelInvitation, ChannelError>;

    async fn pending_invitations(
        &self,
        actor_id: i64,
    ) -> Result<Vec<InvitationWithContext>, ChannelError>;
}

#[derive(Debug, Clone)]
pub struct CreateChannelInput {
    pub name: String,
    pub description: String,
    pub is_private: bool,
    pub university_id: i64,
    pub career_id: i64,
}

/// Channel service errors
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel not found")]
    NotFound,

    #[error("You are not a member of this channel")]
    NotMember,

    #[error("Only channel admins can invite users")]
    NotAdmin,

    #[error("User not found")]
    UserNotFound,

    #[error("User is already a member of this channel")]
    AlreadyMember,

    #[error("User already has a pending invitation")]
    AlreadyInvited,

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("This invitation is not addressed to you")]
    NotInvitee,

    #[error("Invitation has already been handled")]
    AlreadyHandled,

    #[error("Invalid action, expected 'accept' or 'reject'")]
    InvalidAction,

    #[error("Career does not belong to the selected university")]
    InvalidScope,

    #[error(transparent)]
    Repository(#[from] AppError),
}

/// ChannelService implementation
pub struct ChannelServiceImpl<C, I, U, D>
where
    C: ChannelRepository,
    I: InvitationRepository,
    U: UserRepository,
    D: DirectoryRepository,
{
    channel_repo: Arc<C>,
    invitation_repo: Arc<I>,
    user_repo: Arc<U>,
    directory_repo: Arc<D>,
}

impl<C, I, U, D> ChannelServiceImpl<C, I, U, D>
where
    C: ChannelRepository,
    I: InvitationRepository,
    U: UserRepository,
    D: DirectoryRepository,
{
    pub fn new(
        channel_repo: Arc<C>,
        invitation_repo: Arc<I>,
        user_repo: Arc<U>,
        directory_repo: Arc<D>,
    ) -> Self {
        Self {
            channel_repo,
            invitation_repo,
            user_repo,
            directory_repo,
        }
    }
}

#[async_trait]
impl<C, I, U, D> ChannelService for ChannelServiceImpl<C, I, U, D>
where
    C: ChannelRepository + 'static,
    I: InvitationRepository + 'static,
    U: UserRepository + 'static,
    D: DirectoryRepository + 'static,
{
    async fn create(
        &self,
        actor_id: i64,
        input: CreateChannelInput,
    ) -> Result<ChannelDetails, ChannelError> {
        let career = self.directory_repo.find_career(input.career_id).await?;
        if !career.is_some_and(|c| c.university_id == input.university_id) {
            return Err(ChannelError::InvalidScope);
        }

        let channel = self
            .channel_repo
            .create_with_admin(NewChannel {
                name: input.name,
                description: input.description,
                is_private: input.is_private,
                university_id: input.university_id,
                career_id: input.career_id,
                created_by: actor_id,
            })
            .await?;

        tracing::info!(channel_id = channel.id, created_by = actor_id, "Channel created");

        self.channel_repo
            .find_details(channel.id)
            .await?
            .ok_or(ChannelError::NotFound)
    }

    async fn list(&self, actor_id: i64) -> Result<Vec<ChannelDetails>, ChannelError> {
        Ok(self.channel_repo.list_for_member(actor_id).await?)
    }

    async fn get(&self, channel_id: i64, actor_id: i64) -> Result<ChannelDetails, ChannelError> {
        let member = self.channel_repo.find_member(channel_id, actor_id).await?;
        if !ChannelPolicy::can_participate(member.as_ref()) {
            return Err(ChannelError::NotMember);
        }

        let details = self
            .channel_repo
            .find_details(channel_id)
            .await?
            .ok_or(ChannelError::NotFound)?;

        self.channel_repo.touch_last_seen(channel_id, actor_id).await?;
        Ok(details)
    }

    async fn invite(
        &self,
        channel_id: i64,
        actor_id: i64,
        invited_user: i64,
    ) -> Result<ChannelInvitation, ChannelError> {
        let member = self.channel_repo.find_member(channel_id, actor_id).await?;
        if !ChannelPolicy::can_invite(member.as_ref()) {
            return Err(ChannelError::NotAdmin);
        }

        if self.user_repo.find_by_id(invited_user).await?.is_none() {
            return Err(ChannelError::UserNotFound);
        }
        if self
            .channel_repo
            .find_member(channel_id, invited_user)
            .await?
            .is_some()
        {
            return Err(ChannelError::AlreadyMember);
        }
        if self.invitation_repo.has_pending(channel_id, invited_user).await? {
            return Err(ChannelError::AlreadyInvited);
        }

        let invitation = self
            .invitation_repo
            .create(channel_id, actor_id, invited_user)
            .await?;

        tracing::info!(
            invitation_id = invitation.id,
            channel_id,
            invited_user,
            "Channel invitation created"
        );
        Ok(invitation)
    }

    async fn handle_invitation(
        &self,
        invitation_id: i64,
        actor_id: i64,
        action: &str,
    ) -> Result<ChannelInvitation, ChannelError> {
        let invitation = self
            .invitation_repo
            .find_by_id(invitation_id)
            .await?
            .ok_or(ChannelError::InvitationNotFound)?;

        if invitation.invited_user != actor_id {
            return Err(ChannelError::NotInvitee);
        }
        if !invitation.is_pending() {
            return Err(ChannelError::AlreadyHandled);
        }

        let handled = match InvitationAction::parse(action).ok_or(ChannelError::InvalidAction)? {
            InvitationAction::Accept => self.invitation_repo.accept(invitation_id).await?,
            InvitationAction::Reject => self.invitation_repo.reject(invitation_id).await?,
        };

        // None means another request handled it first.
        let handled = handled.ok_or(ChannelError::AlreadyHandled)?;
        tracing::info!(invitation_id, status = %handled.status, "Channel invitation handled");
        Ok(handled)
    }

    async fn pending_invitations(
        &self,
        actor_id: i64,
    ) -> Result<Vec<InvitationWithContext>, ChannelError> {
        Ok(self.invitation_repo.list_pending_for(actor_id).await?)
    }
}
