//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::application::dto::response::{MessageResponse, RegisterResponse, TokenResponse};
use crate::application::services::{
    AuthError, AuthService, AuthServiceImpl, Credentials, Registration,
};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::http::extractors::ValidatedJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

const RESET_REQUESTED: &str = "If the email exists, you will receive a message with instructions";

fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.mailer.clone(),
        state.settings.jwt.clone(),
        state.settings.mail.reset_url.clone(),
    )
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::UserExists => AppError::BadRequest(e.to_string()),
            AuthError::InvalidResetToken => AppError::BadRequest(e.to_string()),
            AuthError::TokenExpired | AuthError::InvalidToken => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::Repository(e) => e,
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = auth_service(&state)
        .register(Registration {
            username: body.username,
            email: body.email,
            password: body.password,
            account_name: body.account_name,
            img: body.img,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user_id: user.id,
        }),
    ))
}

/// Login with email or username
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if !body.has_identifier() {
        return Err(AppError::BadRequest("Email or username is required".into()));
    }

    let token = auth_service(&state)
        .authenticate(Credentials {
            email: body.email,
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// Always answers with the same message, whether or not the account exists
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_service(&state)
        .request_password_reset(body.email.trim())
        .await?;

    Ok(Json(MessageResponse::new(RESET_REQUESTED)))
}

pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_service(&state)
        .reset_password(body.token.trim(), &body.password)
        .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
