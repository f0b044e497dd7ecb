//! Custom Extractors
//!
//! Request-body extractors that reject with [`AppError`] so every failure
//! renders as `{"error": ...}`.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::infrastructure::media::UploadFile;
use crate::shared::error::AppError;
use crate::shared::validation::{parse_id, validate};

/// JSON body that has passed its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        validate(&value)?;
        Ok(Self(value))
    }
}

/// A multipart form read fully into memory.
///
/// Text parts are kept in arrival order so repeated names (`tags`, `tag_ids[]`)
/// survive; parts with a filename become [`UploadFile`]s.
#[derive(Debug, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<(String, UploadFile)>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(bad_multipart)?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.push((
                        name,
                        UploadFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    ));
                }
                None => {
                    let value = field.text().await.map_err(bad_multipart)?;
                    form.fields.push((name, value));
                }
            }
        }

        Ok(form)
    }

    /// First non-blank value of a text field, trimmed.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))
    }

    /// Required positive integer field.
    pub fn id(&self, name: &str) -> Result<i64, AppError> {
        parse_id(self.required(name)?, name)
    }

    /// All values under any of `names`, with comma-separated values split.
    pub fn values(&self, names: &[&str]) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(n, _)| names.contains(&n.as_str()))
            .flat_map(|(_, v)| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    }

    /// Remove and return files uploaded under any of `names`.
    pub fn take_files(&mut self, names: &[&str]) -> Vec<UploadFile> {
        let (taken, kept) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(n, _)| names.contains(&n.as_str()));
        self.files = kept;
        taken.into_iter().map(|(_, f)| f).collect()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadFile> {
        self.take_files(&[name]).into_iter().next()
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        FormData::read(multipart).await
    }
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
}

/// A body sent either as JSON or as a multipart form, chosen by `Content-Type`.
#[derive(Debug)]
pub enum JsonOrForm<T> {
    Json(T),
    Form(FormData),
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            Ok(Self::Form(FormData::from_request(req, state).await?))
        } else {
            let ValidatedJson(value) = ValidatedJson::<T>::from_request(req, state).await?;
            Ok(Self::Json(value))
        }
    }
}
