use async_trait::async_trait;
use sqlx::PgPool;

use super::engagement::summary;
use crate::domain::{FollowRepository, Toggle, UserSummary};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct FollowerRow {
    id: i64,
    username: String,
    img: Option<String>,
}

#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn toggle(&self, follower_id: i64, followed_id: i64) -> Result<Toggle, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let outcome = if removed > 0 {
            Toggle::Removed
        } else {
            sqlx::query(
                r#"
                INSERT INTO follows (follower_id, followed_id)
                VALUES ($1, $2)
                ON CONFLICT (follower_id, followed_id) DO NOTHING
                "#,
            )
            .bind(follower_id)
            .bind(followed_id)
            .execute(&mut *tx)
            .await?;
            Toggle::Added
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn followers_of(&self, user_id: i64) -> Result<Vec<UserSummary>, AppError> {
        let rows = sqlx::query_as::<_, FollowerRow>(
            r#"
            SELECT u.id, u.username, u.img
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followed_id = $1
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| summary(r.id, r.username, r.img))
            .collect())
    }
}
