//! Comments, likes and attachments.
//!
//! Feed posts and channel posts keep these in parallel tables with identical
//! columns. Every helper takes a [`ChildTables`] naming the set to use, and
//! batch-loads by post id so listing a page costs a fixed number of queries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::domain::{
    Attachment, Comment, CommentWithAuthor, Like, LikeWithAuthor, NewAttachment, Toggle,
    UserSummary,
};
use crate::shared::error::AppError;

/// Table names for one post family. Only the constants below exist, so the
/// names are safe to interpolate into SQL.
#[derive(Debug, Clone, Copy)]
pub(super) struct ChildTables {
    pub comments: &'static str,
    pub likes: &'static str,
    pub files: &'static str,
}

pub(super) const FEED_TABLES: ChildTables = ChildTables {
    comments: "comments",
    likes: "post_likes",
    files: "post_files",
};

pub(super) const CHANNEL_TABLES: ChildTables = ChildTables {
    comments: "channel_post_comments",
    likes: "channel_post_likes",
    files: "channel_post_files",
};

pub(super) fn summary(id: i64, username: String, img: Option<String>) -> UserSummary {
    UserSummary {
        id,
        username,
        avatar_url: img.filter(|url| !url.is_empty()),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    content: String,
    created_at: DateTime<Utc>,
    username: String,
    img: Option<String>,
}

impl CommentRow {
    fn into_comment(self) -> CommentWithAuthor {
        CommentWithAuthor {
            author: summary(self.user_id, self.username, self.img),
            comment: Comment {
                id: self.id,
                post_id: self.post_id,
                user_id: self.user_id,
                content: self.content,
                created_at: self.created_at,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    liked_at: DateTime<Utc>,
    username: String,
    img: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    id: i64,
    post_id: i64,
    file_url: String,
    file_type: String,
    file_name: String,
}

/// Everything hanging off a set of posts, keyed by post id.
#[derive(Debug, Default)]
pub(super) struct Children {
    pub comments: HashMap<i64, Vec<CommentWithAuthor>>,
    pub likes: HashMap<i64, Vec<LikeWithAuthor>>,
    pub files: HashMap<i64, Vec<Attachment>>,
}

impl Children {
    pub fn take(
        &mut self,
        post_id: i64,
    ) -> (Vec<CommentWithAuthor>, Vec<LikeWithAuthor>, Vec<Attachment>) {
        (
            self.comments.remove(&post_id).unwrap_or_default(),
            self.likes.remove(&post_id).unwrap_or_default(),
            self.files.remove(&post_id).unwrap_or_default(),
        )
    }
}

pub(super) async fn load_children(
    pool: &PgPool,
    tables: ChildTables,
    post_ids: &[i64],
) -> Result<Children, AppError> {
    if post_ids.is_empty() {
        return Ok(Children::default());
    }

    let mut children = Children::default();

    let comments = sqlx::query_as::<_, CommentRow>(&format!(
        r#"
        SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, u.username, u.img
        FROM {} c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = ANY($1)
        ORDER BY c.created_at, c.id
        "#,
        tables.comments
    ))
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    for row in comments {
        children
            .comments
            .entry(row.post_id)
            .or_default()
            .push(row.into_comment());
    }

    let likes = sqlx::query_as::<_, LikeRow>(&format!(
        r#"
        SELECT l.id, l.post_id, l.user_id, l.liked_at, u.username, u.img
        FROM {} l
        JOIN users u ON u.id = l.user_id
        WHERE l.post_id = ANY($1)
        ORDER BY l.liked_at, l.id
        "#,
        tables.likes
    ))
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    for row in likes {
        children.likes.entry(row.post_id).or_default().push(LikeWithAuthor {
            author: summary(row.user_id, row.username, row.img),
            like: Like {
                id: row.id,
                post_id: row.post_id,
                user_id: row.user_id,
                liked_at: row.liked_at,
            },
        });
    }

    let files = sqlx::query_as::<_, FileRow>(&format!(
        r#"
        SELECT id, post_id, file_url, file_type, file_name
        FROM {}
        WHERE post_id = ANY($1)
        ORDER BY id
        "#,
        tables.files
    ))
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    for row in files {
        children.files.entry(row.post_id).or_default().push(Attachment {
            id: row.id,
            post_id: row.post_id,
            file_url: row.file_url,
            file_type: row.file_type,
            file_name: row.file_name,
        });
    }

    Ok(children)
}

/// Insert attachment rows inside the caller's transaction.
pub(super) async fn insert_files(
    conn: &mut PgConnection,
    tables: ChildTables,
    post_id: i64,
    files: &[NewAttachment],
) -> Result<(), AppError> {
    if files.is_empty() {
        return Ok(());
    }

    let urls: Vec<&str> = files.iter().map(|f| f.file_url.as_str()).collect();
    let types: Vec<&str> = files.iter().map(|f| f.file_type.as_str()).collect();
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();

    sqlx::query(&format!(
        r#"
        INSERT INTO {} (post_id, file_url, file_type, file_name)
        SELECT $1, url, kind, name
        FROM UNNEST($2::text[], $3::text[], $4::text[]) AS f(url, kind, name)
        "#,
        tables.files
    ))
    .bind(post_id)
    .bind(&urls)
    .bind(&types)
    .bind(&names)
    .execute(conn)
    .await?;

    Ok(())
}

/// Delete the like if present, otherwise insert it, in one transaction.
pub(super) async fn toggle_like(
    pool: &PgPool,
    tables: ChildTables,
    post_id: i64,
    user_id: i64,
) -> Result<Toggle, AppError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(&format!(
        "DELETE FROM {} WHERE post_id = $1 AND user_id = $2",
        tables.likes
    ))
    .bind(post_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let outcome = if removed > 0 {
        Toggle::Removed
    } else {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
            tables.likes
        ))
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        Toggle::Added
    };

    tx.commit().await?;
    Ok(outcome)
}

pub(super) async fn remove_like(
    pool: &PgPool,
    tables: ChildTables,
    post_id: i64,
    user_id: i64,
) -> Result<bool, AppError> {
    let removed = sqlx::query(&format!(
        "DELETE FROM {} WHERE post_id = $1 AND user_id = $2",
        tables.likes
    ))
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(removed > 0)
}

pub(super) async fn insert_comment(
    pool: &PgPool,
    tables: ChildTables,
    post_id: i64,
    user_id: i64,
    content: &str,
) -> Result<CommentWithAuthor, AppError> {
    let row = sqlx::query_as::<_, CommentRow>(&format!(
        r#"
        WITH c AS (
            INSERT INTO {} (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id, content, created_at
        )
        SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, u.username, u.img
        FROM c
        JOIN users u ON u.id = c.user_id
        "#,
        tables.comments
    ))
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await?;

    Ok(row.into_comment())
}

/// Escape LIKE wildcards so user input matches literally.
pub(super) fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
