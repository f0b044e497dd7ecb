//! Channel post storage. Children use the `channel_post_*` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::engagement::{self, summary, CHANNEL_TABLES};
use crate::domain::{
    ChannelPost, ChannelPostDetails, ChannelPostRepository, CommentWithAuthor, NewAttachment,
    NewChannelPost, Toggle,
};
use crate::shared::error::AppError;

const POST_COLUMNS: &str = "id, channel_id, user_id, content, tags, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ChannelPostRow {
    id: i64,
    channel_id: i64,
    user_id: i64,
    content: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChannelPostRow {
    fn into_post(self) -> ChannelPost {
        ChannelPost {
            id: self.id,
            channel_id: self.channel_id,
            user_id: self.user_id,
            content: self.content,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DetailsRow {
    #[sqlx(flatten)]
    post: ChannelPostRow,
    username: String,
    img: Option<String>,
}

#[derive(Clone)]
pub struct PgChannelPostRepository {
    pool: PgPool,
}

impl PgChannelPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<DetailsRow>) -> Result<Vec<ChannelPostDetails>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.post.id).collect();
        let mut children = engagement::load_children(&self.pool, CHANNEL_TABLES, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let (comments, likes, files) = children.take(row.post.id);
                ChannelPostDetails {
                    author: summary(row.post.user_id, row.username, row.img),
                    post: row.post.into_post(),
                    comments,
                    likes,
                    files,
                }
            })
            .collect())
    }

    fn details_sql(filter: &str) -> String {
        format!(
            r#"
            SELECT p.id, p.channel_id, p.user_id, p.content, p.tags, p.created_at, p.updated_at,
                   u.username, u.img
            FROM channel_posts p
            JOIN users u ON u.id = p.user_id
            WHERE {}
            ORDER BY p.created_at DESC, p.id DESC
            "#,
            filter
        )
    }
}

#[async_trait]
impl ChannelPostRepository for PgChannelPostRepository {
    async fn create(
        &self,
        post: NewChannelPost,
        files: Vec<NewAttachment>,
    ) -> Result<ChannelPost, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO channel_posts (channel_id, user_id, content, tags)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let row = sqlx::query_as::<_, ChannelPostRow>(&sql)
            .bind(post.channel_id)
            .bind(post.user_id)
            .bind(&post.content)
            .bind(&post.tags)
            .fetch_one(&mut *tx)
            .await?;

        engagement::insert_files(&mut tx, CHANNEL_TABLES, row.id, &files).await?;

        tx.commit().await?;
        Ok(row.into_post())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelPost>, AppError> {
        let sql = format!("SELECT {} FROM channel_posts WHERE id = $1", POST_COLUMNS);
        let row = sqlx::query_as::<_, ChannelPostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ChannelPostRow::into_post))
    }

    async fn find_details(&self, id: i64) -> Result<Option<ChannelPostDetails>, AppError> {
        let row = sqlx::query_as::<_, DetailsRow>(&Self::details_sql("p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_for_channel(&self, channel_id: i64) -> Result<Vec<ChannelPostDetails>, AppError> {
        let rows = sqlx::query_as::<_, DetailsRow>(&Self::details_sql("p.channel_id = $1"))
            .bind(channel_id)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM channel_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".into()));
        }
        Ok(())
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Toggle, AppError> {
        engagement::toggle_like(&self.pool, CHANNEL_TABLES, post_id, user_id).await
    }

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, AppError> {
        engagement::insert_comment(&self.pool, CHANNEL_TABLES, post_id, user_id, content).await
    }
}
