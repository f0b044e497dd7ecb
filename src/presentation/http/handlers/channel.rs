//! Channel and Invitation Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::application::dto::request::{
    CreateChannelRequest, HandleInvitationRequest, InviteRequest,
};
use crate::application::dto::response::{
    ChannelListResponse, ChannelResponse, InvitationListResponse, InvitationResponse,
};
use crate::application::services::{
    ChannelError, ChannelService, ChannelServiceImpl, CreateChannelInput,
};
use crate::infrastructure::repositories::{
    PgChannelRepository, PgDirectoryRepository, PgInvitationRepository, PgUserRepository,
};
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn channel_service(
    state: &AppState,
) -> ChannelServiceImpl<
    PgChannelRepository,
    PgInvitationRepository,
    PgUserRepository,
    PgDirectoryRepository,
> {
    ChannelServiceImpl::new(
        Arc::new(PgChannelRepository::new(state.db.clone())),
        Arc::new(PgInvitationRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgDirectoryRepository::new(state.db.clone())),
    )
}

impl From<ChannelError> for AppError {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::NotFound
            | ChannelError::UserNotFound
            | ChannelError::InvitationNotFound => AppError::NotFound(e.to_string()),
            ChannelError::NotMember | ChannelError::NotAdmin | ChannelError::NotInvitee => {
                AppError::Forbidden(e.to_string())
            }
            ChannelError::AlreadyMember
            | ChannelError::AlreadyInvited
            | ChannelError::AlreadyHandled
            | ChannelError::InvalidAction
            | ChannelError::InvalidScope => AppError::BadRequest(e.to_string()),
            ChannelError::Repository(e) => e,
        }
    }
}

pub async fn create_channel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateChannelRequest>,
) -> Result<(StatusCode, Json<ChannelResponse>), AppError> {
    let input = CreateChannelInput {
        name: body.name,
        description: body.description,
        is_private: body.is_private,
        university_id: body.university_id,
        career_id: body.career_id,
    };
    let channel = channel_service(&state).create(auth.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChannelResponse {
            message: Some("Channel created successfully".into()),
            channel: channel.into(),
        }),
    ))
}

/// Channels the caller is a member of
pub async fn list_channels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ChannelListResponse>, AppError> {
    let channels = channel_service(&state).list(auth.user_id).await?;
    Ok(Json(ChannelListResponse {
        channels: channels.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_channel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> Result<Json<ChannelResponse>, AppError> {
    let channel_id = parse_id(&channel_id, "channel id")?;
    let channel = channel_service(&state).get(channel_id, auth.user_id).await?;
    Ok(Json(ChannelResponse {
        message: None,
        channel: channel.into(),
    }))
}

pub async fn invite_to_channel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<String>,
    ValidatedJson(body): ValidatedJson<InviteRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), AppError> {
    let channel_id = parse_id(&channel_id, "channel id")?;
    let invitation = channel_service(&state)
        .invite(channel_id, auth.user_id, body.invited_user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InvitationResponse {
            message: "Invitation sent successfully".into(),
            invitation: invitation.into(),
        }),
    ))
}

/// `POST /channels/invitations/{id}` with `{"action": "accept" | "reject"}`
pub async fn handle_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(invitation_id): Path<String>,
    ValidatedJson(body): ValidatedJson<HandleInvitationRequest>,
) -> Result<Json<InvitationResponse>, AppError> {
    let invitation_id = parse_id(&invitation_id, "invitation id")?;
    let invitation = channel_service(&state)
        .handle_invitation(invitation_id, auth.user_id, &body.action)
        .await?;

    Ok(Json(InvitationResponse {
        message: format!("Invitation {}", invitation.status),
        invitation: invitation.into(),
    }))
}

pub async fn pending_invitations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<InvitationListResponse>, AppError> {
    let invitations = channel_service(&state).pending_invitations(auth.user_id).await?;
    Ok(Json(InvitationListResponse {
        invitations: invitations.into_iter().map(Into::into).collect(),
    }))
}
