//! Directory Handlers
//!
//! Universities, careers and tags. Reads are public; creation needs a token.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateCareerRequest, CreateUniversityRequest};
use crate::application::dto::response::{
    CareerResponse, CareersResponse, TagView, UniversitiesResponse, UniversityResponse,
};
use crate::application::services::{DirectoryError, DirectoryService, DirectoryServiceImpl};
use crate::infrastructure::repositories::{PgDirectoryRepository, PgTagRepository};
use crate::presentation::http::extractors::ValidatedJson;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn directory_service(state: &AppState) -> DirectoryServiceImpl<PgDirectoryRepository, PgTagRepository> {
    DirectoryServiceImpl::new(
        Arc::new(PgDirectoryRepository::new(state.db.clone())),
        Arc::new(PgTagRepository::new(state.db.clone())),
    )
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::UniversityNotFound | DirectoryError::CareerNotFound => {
                AppError::NotFound(e.to_string())
            }
            DirectoryError::EmptyName => AppError::BadRequest(e.to_string()),
            DirectoryError::Repository(e) => e,
        }
    }
}

/// All universities with their careers, alphabetical
pub async fn list_universities(
    State(state): State<AppState>,
) -> Result<Json<UniversitiesResponse>, AppError> {
    let universities = directory_service(&state).universities().await?;
    Ok(Json(UniversitiesResponse {
        universities: universities.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_university(
    State(state): State<AppState>,
    Path(university_id): Path<String>,
) -> Result<Json<UniversityResponse>, AppError> {
    let university_id = parse_id(&university_id, "university id")?;
    let university = directory_service(&state).university(university_id).await?;
    Ok(Json(UniversityResponse {
        university: university.into(),
    }))
}

pub async fn list_university_careers(
    State(state): State<AppState>,
    Path(university_id): Path<String>,
) -> Result<Json<CareersResponse>, AppError> {
    let university_id = parse_id(&university_id, "university id")?;
    let careers = directory_service(&state).careers_of(university_id).await?;
    Ok(Json(CareersResponse {
        careers: careers.into_iter().map(Into::into).collect(),
    }))
}

pub async fn list_careers(State(state): State<AppState>) -> Result<Json<CareersResponse>, AppError> {
    let careers = directory_service(&state).careers().await?;
    Ok(Json(CareersResponse {
        careers: careers.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_career(
    State(state): State<AppState>,
    Path(career_id): Path<String>,
) -> Result<Json<CareerResponse>, AppError> {
    let career_id = parse_id(&career_id, "career id")?;
    let career = directory_service(&state).career(career_id).await?;
    Ok(Json(CareerResponse {
        career: career.into(),
    }))
}

pub async fn create_university(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateUniversityRequest>,
) -> Result<(StatusCode, Json<UniversityResponse>), AppError> {
    let university = directory_service(&state).create_university(&body.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(UniversityResponse {
            university: university.into(),
        }),
    ))
}

pub async fn create_career(
    State(state): State<AppState>,
    Path(university_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateCareerRequest>,
) -> Result<(StatusCode, Json<CareerResponse>), AppError> {
    let university_id = parse_id(&university_id, "university id")?;
    let career = directory_service(&state)
        .create_career(university_id, &body.name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CareerResponse {
            career: career.into(),
        }),
    ))
}

/// Bare array; seeds the default tags on first use.
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagView>>, AppError> {
    let tags = directory_service(&state).tags().await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}
