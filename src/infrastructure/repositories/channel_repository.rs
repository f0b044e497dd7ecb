//! Channel Repository Implementation
//!
//! PostgreSQL implementation of ChannelRepository, covering `channels` and
//! `channel_members`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::engagement::summary;
use crate::domain::{
    Career, Channel, ChannelDetails, ChannelMember, ChannelRepository, MemberWithUser,
    NewChannel, University,
};
use crate::infrastructure::database::is_foreign_key_violation;
use crate::shared::error::AppError;

const CHANNEL_COLUMNS: &str =
    "id, name, description, created_by, is_private, university_id, career_id, created_at";

const DETAILS_SELECT: &str = r#"
    SELECT ch.id, ch.name, ch.description, ch.created_by, ch.is_private,
           ch.university_id, ch.career_id, ch.created_at,
           u.username AS creator_username, u.img AS creator_img,
           un.name AS university_name, c.name AS career_name
    FROM channels ch
    JOIN users u ON u.id = ch.created_by
    LEFT JOIN universities un ON un.id = ch.university_id
    LEFT JOIN careers c ON c.id = ch.career_id
"#;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ChannelRow {
    id: i64,
    name: String,
    description: String,
    created_by: i64,
    is_private: bool,
    university_id: i64,
    career_id: i64,
    created_at: DateTime<Utc>,
}

impl ChannelRow {
    pub(super) fn into_channel(self) -> Channel {
        Channel {
            id: self.id,
            name: self.name,
            description: self.description,
            created_by: self.created_by,
            is_private: self.is_private,
            university_id: self.university_id,
            career_id: self.career_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChannelDetailsRow {
    #[sqlx(flatten)]
    channel: ChannelRow,
    creator_username: String,
    creator_img: Option<String>,
    university_name: Option<String>,
    career_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: i64,
    channel_id: i64,
    user_id: i64,
    is_admin: bool,
    joined_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> ChannelMember {
        ChannelMember {
            id: self.id,
            channel_id: self.channel_id,
            user_id: self.user_id,
            is_admin: self.is_admin,
            joined_at: self.joined_at,
            last_seen_at: self.last_seen_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberWithUserRow {
    #[sqlx(flatten)]
    member: MemberRow,
    username: String,
    img: Option<String>,
}

#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<ChannelDetailsRow>) -> Result<Vec<ChannelDetails>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.channel.id).collect();

        let members = sqlx::query_as::<_, MemberWithUserRow>(
            r#"
            SELECT m.id, m.channel_id, m.user_id, m.is_admin, m.joined_at, m.last_seen_at,
                   u.username, u.img
            FROM channel_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.channel_id = ANY($1)
            ORDER BY m.joined_at, m.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_channel: HashMap<i64, Vec<MemberWithUser>> = HashMap::new();
        for row in members {
            let user = summary(row.member.user_id, row.username, row.img);
            by_channel
                .entry(row.member.channel_id)
                .or_default()
                .push(MemberWithUser {
                    member: row.member.into_member(),
                    user,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let channel = row.channel.into_channel();
                ChannelDetails {
                    creator: summary(channel.created_by, row.creator_username, row.creator_img),
                    university: row.university_name.map(|name| University {
                        id: channel.university_id,
                        name,
                    }),
                    career: row.career_name.map(|name| Career {
                        id: channel.career_id,
                        name,
                        university_id: channel.university_id,
                    }),
                    members: by_channel.remove(&channel.id).unwrap_or_default(),
                    channel,
                }
            })
            .collect())
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    async fn create_with_admin(&self, channel: NewChannel) -> Result<Channel, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO channels (name, description, is_private, university_id, career_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CHANNEL_COLUMNS
        );
        let row = sqlx::query_as::<_, ChannelRow>(&sql)
            .bind(&channel.name)
            .bind(&channel.description)
            .bind(channel.is_private)
            .bind(channel.university_id)
            .bind(channel.career_id)
            .bind(channel.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::BadRequest("Unknown university or career".into())
                } else {
                    AppError::Database(e)
                }
            })?;

        sqlx::query(
            "INSERT INTO channel_members (channel_id, user_id, is_admin) VALUES ($1, $2, TRUE)",
        )
        .bind(row.id)
        .bind(channel.created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into_channel())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Channel>, AppError> {
        let sql = format!("SELECT {} FROM channels WHERE id = $1", CHANNEL_COLUMNS);
        let row = sqlx::query_as::<_, ChannelRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ChannelRow::into_channel))
    }

    async fn find_details(&self, id: i64) -> Result<Option<ChannelDetails>, AppError> {
        let sql = format!("{} WHERE ch.id = $1", DETAILS_SELECT);
        let row = sqlx::query_as::<_, ChannelDetailsRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_for_member(&self, user_id: i64) -> Result<Vec<ChannelDetails>, AppError> {
        let sql = format!(
            r#"
            {}
            WHERE EXISTS (
                SELECT 1 FROM channel_members m
                WHERE m.channel_id = ch.id AND m.user_id = $1
            )
            ORDER BY ch.created_at DESC, ch.id DESC
            "#,
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, ChannelDetailsRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn find_member(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<Option<ChannelMember>, AppError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, channel_id, user_id, is_admin, joined_at, last_seen_at
            FROM channel_members
            WHERE channel_id = $1 AND user_id = $2
            "#,
        )
        .bind(channel_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MemberRow::into_member))
    }

    async fn touch_last_seen(&self, channel_id: i64, user_id: i64) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE channel_members SET last_seen_at = NOW() WHERE channel_id = $1 AND user_id = $2",
        )
        .bind(channel_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
