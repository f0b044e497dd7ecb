//! Authentication Service
//!
//! Handles registration, credential checks, JWT issuing and the
//! password-reset flow.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::JwtSettings;
use crate::domain::{NewUser, User, UserRepository};
use crate::infrastructure::mail::{password_reset_email, Mailer};
use crate::shared::error::AppError;

/// Lifetime of a password-reset token.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Authenticate by email (preferred) or username and issue a token
    async fn authenticate(&self, login: Credentials) -> Result<String, AuthError>;

    /// Email a reset token if the account exists. Silent otherwise.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Consume a reset token and set a new password
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub account_name: Option<String>,
    pub img: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username or email already exists")]
    UserExists,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(user_id: i64, settings: &JwtSettings) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::hours(settings.token_expiry_hours)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
}

/// Decode and validate a bearer token
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// 32 random bytes, hex encoded.
fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Only the digest of a reset token is stored.
pub fn reset_token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// AuthService implementation
pub struct AuthServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    mailer: Arc<dyn Mailer>,
    jwt_settings: JwtSettings,
    reset_url: String,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        mailer: Arc<dyn Mailer>,
        jwt_settings: JwtSettings,
        reset_url: String,
    ) -> Self {
        Self {
            user_repo,
            mailer,
            jwt_settings,
            reset_url,
        }
    }
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        if self.user_repo.find_by_email(&registration.email).await?.is_some()
            || self
                .user_repo
                .find_by_username(&registration.username)
                .await?
                .is_some()
        {
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .user_repo
            .create(NewUser {
                account_name: registration
                    .account_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| registration.username.clone()),
                username: registration.username,
                email: registration.email,
                password_hash,
                avatar_url: registration.img.filter(|url| !url.is_empty()),
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, login: Credentials) -> Result<String, AuthError> {
        let email = login.email.filter(|e| !e.is_empty());
        let user = match (email, login.username) {
            (Some(email), _) => self.user_repo.find_by_email(&email).await?,
            (None, Some(username)) => self.user_repo.find_by_username(&username).await?,
            (None, None) => None,
        }
        .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&login.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        issue_token(user.id, &self.jwt_settings)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.user_repo
            .set_reset_token(user.id, &reset_token_digest(&token), expires_at)
            .await?;

        let message = password_reset_email(&user.email, &self.reset_url, &token);
        if let Err(e) = self.mailer.send(message).await {
            tracing::error!(user_id = user.id, "Failed to send password reset email: {}", e);
        }

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let user = self
            .user_repo
            .find_by_reset_token(&reset_token_digest(token), Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let password_hash = hash_password(new_password)?;
        self.user_repo.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = user.id, "Password reset completed");
        Ok(())
    }
}
