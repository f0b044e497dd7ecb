//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.
//! Maps between the database schema and domain User entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewUser, ProfileStats, ProfileUpdate, User, UserProfile, UserRepository};
use crate::infrastructure::database::{is_foreign_key_violation, is_unique_violation};
use crate::shared::error::AppError;

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, account_name, img, university_id, career_id,
    reset_token_hash, reset_token_expires_at, created_at, updated_at
"#;

/// Database row representation matching the users table schema.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    account_name: String,
    img: Option<String>,
    university_id: Option<i64>,
    career_id: Option<i64>,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            account_name: self.account_name,
            avatar_url: self.img.filter(|url| !url.is_empty()),
            university_id: self.university_id,
            career_id: self.career_id,
            reset_token_hash: self.reset_token_hash,
            reset_token_expires_at: self.reset_token_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    #[sqlx(flatten)]
    user: UserRow,
    university_name: Option<String>,
    career_name: Option<String>,
    posts_count: i64,
    likes_received: i64,
    followers_count: i64,
    following_count: i64,
}

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::BadRequest("Username or email already exists".into())
    } else if is_foreign_key_violation(&e) {
        AppError::BadRequest("Unknown university or career".into())
    } else {
        AppError::Database(e)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_one("username", username).await
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, password_hash, account_name, img)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.account_name)
            .bind(&user.avatar_url)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(row.into_user())
    }

    async fn set_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE reset_token_hash = $1 AND reset_token_expires_at > $2",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<User, AppError> {
        let sql = format!(
            r#"
            UPDATE users
            SET img = $2,
                university_id = $3,
                career_id = $4,
                username = COALESCE($5, username),
                account_name = COALESCE($6, account_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .bind(&update.avatar_url)
            .bind(update.university_id)
            .bind(update.career_id)
            .bind(&update.username)
            .bind(&update.account_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        Ok(row.into_user())
    }

    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.account_name, u.img,
                   u.university_id, u.career_id, u.reset_token_hash, u.reset_token_expires_at,
                   u.created_at, u.updated_at,
                   un.name AS university_name,
                   c.name AS career_name,
                   (SELECT COUNT(*) FROM posts p WHERE p.user_id = u.id) AS posts_count,
                   (SELECT COUNT(*) FROM post_likes l
                      JOIN posts p ON p.id = l.post_id
                     WHERE p.user_id = u.id) AS likes_received,
                   (SELECT COUNT(*) FROM follows f WHERE f.followed_id = u.id) AS followers_count,
                   (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count
            FROM users u
            LEFT JOIN universities un ON un.id = u.university_id
            LEFT JOIN careers c ON c.id = u.career_id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserProfile {
            user: r.user.into_user(),
            university_name: r.university_name,
            career_name: r.career_name,
            stats: ProfileStats {
                posts_count: r.posts_count,
                likes_received: r.likes_received,
                followers_count: r.followers_count,
                following_count: r.following_count,
            },
        }))
    }
}
