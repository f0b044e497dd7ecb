//! Post Repository Implementation
//!
//! Feed posts with authors, directory names, comments, likes, files and tags.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::engagement::{self, summary, FEED_TABLES};
use crate::domain::{
    CommentWithAuthor, NewAttachment, NewPost, Post, PostDetails, PostRepository, PostSearch,
    PostUpdate, Toggle,
};
use crate::infrastructure::database::is_foreign_key_violation;
use crate::shared::error::AppError;

const POST_COLUMNS: &str = "id, user_id, content, tags, university_id, career_id, created_at";

const DETAILS_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.content, p.tags, p.university_id, p.career_id, p.created_at,
           u.username AS author_username, u.img AS author_img,
           un.name AS university_name, c.name AS career_name
    FROM posts p
    JOIN users u ON u.id = p.user_id
    LEFT JOIN universities un ON un.id = p.university_id
    LEFT JOIN careers c ON c.id = p.career_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    content: String,
    tags: Vec<String>,
    university_id: i64,
    career_id: i64,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            user_id: self.user_id,
            content: self.content,
            tags: self.tags,
            university_id: self.university_id,
            career_id: self.career_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostDetailsRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_username: String,
    author_img: Option<String>,
    university_name: Option<String>,
    career_name: Option<String>,
}

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach children to a page of rows, preserving row order.
    async fn hydrate(&self, rows: Vec<PostDetailsRow>) -> Result<Vec<PostDetails>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.post.id).collect();
        let mut children = engagement::load_children(&self.pool, FEED_TABLES, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let (comments, likes, files) = children.take(row.post.id);
                PostDetails {
                    author: summary(row.post.user_id, row.author_username, row.author_img),
                    university_name: row.university_name,
                    career_name: row.career_name,
                    post: row.post.into_post(),
                    comments,
                    likes,
                    files,
                }
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, AppError> {
        let sql = format!("{} WHERE p.id = $1", DETAILS_SELECT);
        let row = sqlx::query_as::<_, PostDetailsRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        author: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostDetails>, AppError> {
        let sql = format!(
            r#"
            {}
            WHERE ($1::bigint IS NULL OR p.user_id = $1)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, PostDetailsRow>(&sql)
            .bind(author)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn count(&self, author: Option<i64>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE ($1::bigint IS NULL OR user_id = $1)",
        )
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn search(&self, filter: &PostSearch) -> Result<Vec<PostDetails>, AppError> {
        let sql = format!(
            r#"
            {}
            WHERE ($1::text IS NULL OR p.content ILIKE $1)
              AND ($2::bigint IS NULL OR p.university_id = $2)
              AND ($3::bigint IS NULL OR p.career_id = $3)
              AND p.tags @> $4::text[]
            ORDER BY p.created_at DESC, p.id DESC
            "#,
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, PostDetailsRow>(&sql)
            .bind(filter.query.as_deref().map(engagement::like_pattern))
            .bind(filter.university_id)
            .bind(filter.career_id)
            .bind(&filter.tags)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn create(&self, post: NewPost, files: Vec<NewAttachment>) -> Result<Post, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO posts (user_id, content, tags, university_id, career_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post.user_id)
            .bind(&post.content)
            .bind(&post.tags)
            .bind(post.university_id)
            .bind(post.career_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::BadRequest("Unknown university or career".into())
                } else {
                    AppError::Database(e)
                }
            })?;

        engagement::insert_files(&mut tx, FEED_TABLES, row.id, &files).await?;

        if !post.tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO post_tags (post_id, tag_id)
                SELECT $1, UNNEST($2::bigint[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(row.id)
            .bind(&post.tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row.into_post())
    }

    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post, AppError> {
        let mut tx = self.pool.begin().await?;
        let (tag_ids, tag_names) = match update.tags {
            Some(tags) => (Some(tags.ids), Some(tags.names)),
            None => (None, None),
        };

        let sql = format!(
            r#"
            UPDATE posts
            SET content = COALESCE($2, content),
                tags = COALESCE($3::text[], tags)
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(&update.content)
            .bind(&tag_names)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

        if let Some(tag_ids) = tag_ids {
            sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO post_tags (post_id, tag_id)
                SELECT $1, UNNEST($2::bigint[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row.into_post())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".into()));
        }
        Ok(())
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Toggle, AppError> {
        engagement::toggle_like(&self.pool, FEED_TABLES, post_id, user_id).await
    }

    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        engagement::remove_like(&self.pool, FEED_TABLES, post_id, user_id).await
    }

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, AppError> {
        engagement::insert_comment(&self.pool, FEED_TABLES, post_id, user_id, content).await
    }
}
