//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use serde::Deserialize;
use validator::Validate;

use crate::application::services::UpdatePostInput;
use crate::domain::PostSearch;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Account name must be at most 100 characters"))]
    pub account_name: Option<String>,

    pub img: Option<String>,
}

/// Login request. Either `email` or `username` identifies the account.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn has_identifier(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.email) || filled(&self.username)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Update post request. Absent fields are left unchanged; tags are chosen
/// by id from `GET /tags`, as on create.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,

    pub tag_ids: Option<Vec<i64>>,
}

impl From<UpdatePostRequest> for UpdatePostInput {
    fn from(req: UpdatePostRequest) -> Self {
        UpdatePostInput {
            content: req.content,
            tag_ids: req.tag_ids,
        }
    }
}

/// Comment on a feed or channel post
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,
}

/// Create channel request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub is_private: bool,

    #[validate(range(min = 1, message = "University is required"))]
    pub university_id: i64,

    #[validate(range(min = 1, message = "Career is required"))]
    pub career_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(range(min = 1, message = "Invited user is required"))]
    pub invited_user_id: i64,
}

/// Accept or reject an invitation
#[derive(Debug, Deserialize, Validate)]
pub struct HandleInvitationRequest {
    #[validate(length(min = 1, message = "Action is required"))]
    pub action: String,
}

/// JSON body for a channel post without attachments
#[derive(Debug, Deserialize, Validate)]
pub struct ChannelPostRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUniversityRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCareerRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
}

/// `?page=` for paginated listings. Kept as text so bad values fall back to page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Query parameters for post search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub university: Option<String>,
    pub career: Option<String>,
    pub tags: Option<String>,
}

impl SearchQuery {
    /// Convert to a filter. Blank parameters are ignored; malformed ids are rejected.
    pub fn into_filter(self) -> Result<PostSearch, AppError> {
        fn present(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        let university_id = present(self.university)
            .map(|raw| parse_id(&raw, "university id"))
            .transpose()?;
        let career_id = present(self.career)
            .map(|raw| parse_id(&raw, "career id"))
            .transpose()?;
        let tags = present(self.tags)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(PostSearch {
            query: present(self.q),
            university_id,
            career_id,
            tags,
        })
    }
}
