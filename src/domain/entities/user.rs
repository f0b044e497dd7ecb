//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

/// A registered student account.
///
/// Maps to the `users` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - username: VARCHAR(50) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - account_name: VARCHAR(100) NOT NULL
/// - img: TEXT NULL (avatar URL)
/// - university_id / career_id: BIGINT NULL
/// - reset_token_hash: VARCHAR(64) NULL (SHA-256 of the emailed token)
/// - reset_token_expires_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub account_name: String,
    pub avatar_url: Option<String>,
    pub university_id: Option<i64>,
    pub career_id: Option<i64>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether a stored reset token matches `token_hash` and has not expired.
    pub fn reset_token_matches(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(stored), Some(expires)) => stored == token_hash && expires > now,
            _ => false,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            account_name: String::new(),
            avatar_url: None,
            university_id: None,
            career_id: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The author block embedded in posts, comments, likes and memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Fields for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub account_name: String,
    pub avatar_url: Option<String>,
}

/// Profile changes applied by `PUT /users/me`.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub avatar_url: String,
    pub university_id: i64,
    pub career_id: i64,
    pub username: Option<String>,
    pub account_name: Option<String>,
}

/// Aggregates shown on a profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileStats {
    pub posts_count: i64,
    pub likes_received: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

/// A user joined with directory names and stats.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub university_name: Option<String>,
    pub career_name: Option<String>,
    pub stats: ProfileStats,
}

/// Repository trait for User data access operations.
///
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a new account. Duplicate username/email yields `AppError::BadRequest`.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// Store a reset token digest and its expiry.
    async fn set_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Find the user holding an unexpired reset token digest.
    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError>;

    /// Replace the password hash and clear any pending reset token.
    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError>;

    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<User, AppError>;

    /// Load a user with university/career names and counters.
    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError>;
}
