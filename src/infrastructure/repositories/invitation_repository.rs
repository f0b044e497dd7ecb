//! Invitation Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::channel_repository::ChannelRow;
use super::engagement::summary;
use crate::domain::{
    ChannelInvitation, InvitationRepository, InvitationStatus, InvitationWithContext,
};
use crate::infrastructure::database::is_unique_violation;
use crate::shared::error::AppError;

const INVITATION_COLUMNS: &str =
    "id, channel_id, invited_by, invited_user, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct InvitationRow {
    id: i64,
    channel_id: i64,
    invited_by: i64,
    invited_user: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InvitationRow {
    fn into_invitation(self) -> ChannelInvitation {
        ChannelInvitation {
            id: self.id,
            channel_id: self.channel_id,
            invited_by: self.invited_by,
            invited_user: self.invited_user,
            status: InvitationStatus::from_db(&self.status),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Column aliases keep the flattened rows apart: `inv_*` for the
/// invitation, plain names for the channel.
#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    inv_id: i64,
    inv_invited_by: i64,
    inv_invited_user: i64,
    inv_status: String,
    inv_created_at: DateTime<Utc>,
    inv_updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    channel: ChannelRow,
    inviter_username: String,
    inviter_img: Option<String>,
}

#[derive(Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    async fn create(
        &self,
        channel_id: i64,
        invited_by: i64,
        invited_user: i64,
    ) -> Result<ChannelInvitation, AppError> {
        let sql = format!(
            r#"
            INSERT INTO channel_invitations (channel_id, invited_by, invited_user, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(channel_id)
            .bind(invited_by)
            .bind(invited_user)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::BadRequest("User already has a pending invitation".into())
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(row.into_invitation())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError> {
        let sql = format!(
            "SELECT {} FROM channel_invitations WHERE id = $1",
            INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(InvitationRow::into_invitation))
    }

    async fn has_pending(&self, channel_id: i64, invited_user: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM channel_invitations
                WHERE channel_id = $1 AND invited_user = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(channel_id)
        .bind(invited_user)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn accept(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE channel_invitations
            SET status = 'accepted', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        );
        let Some(row) = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO channel_members (channel_id, user_id, is_admin)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (channel_id, user_id) DO NOTHING
            "#,
        )
        .bind(row.channel_id)
        .bind(row.invited_user)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into_invitation()))
    }

    async fn reject(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError> {
        let sql = format!(
            r#"
            UPDATE channel_invitations
            SET status = 'rejected', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(InvitationRow::into_invitation))
    }

    async fn list_pending_for(&self, user_id: i64) -> Result<Vec<InvitationWithContext>, AppError> {
        let rows = sqlx::query_as::<_, PendingRow>(
            r#"
            SELECT i.id AS inv_id, i.invited_by AS inv_invited_by,
                   i.invited_user AS inv_invited_user, i.status AS inv_status,
                   i.created_at AS inv_created_at, i.updated_at AS inv_updated_at,
                   ch.id, ch.name, ch.description, ch.created_by, ch.is_private,
                   ch.university_id, ch.career_id, ch.created_at,
                   u.username AS inviter_username, u.img AS inviter_img
            FROM channel_invitations i
            JOIN channels ch ON ch.id = i.channel_id
            JOIN users u ON u.id = i.invited_by
            WHERE i.invited_user = $1 AND i.status = 'pending'
            ORDER BY i.created_at DESC, i.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let channel = row.channel.into_channel();
                InvitationWithContext {
                    invitation: ChannelInvitation {
                        id: row.inv_id,
                        channel_id: channel.id,
                        invited_by: row.inv_invited_by,
                        invited_user: row.inv_invited_user,
                        status: InvitationStatus::from_db(&row.inv_status),
                        created_at: row.inv_created_at,
                        updated_at: row.inv_updated_at,
                    },
                    inviter: summary(row.inv_invited_by, row.inviter_username, row.inviter_img),
                    channel,
                }
            })
            .collect())
    }
}
