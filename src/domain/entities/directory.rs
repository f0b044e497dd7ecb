//! Universities and careers.

use async_trait::async_trait;

use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct University {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Career {
    pub id: i64,
    pub name: String,
    pub university_id: i64,
}

#[derive(Debug, Clone)]
pub struct UniversityWithCareers {
    pub university: University,
    pub careers: Vec<Career>,
}

/// Read/write access to the university and career catalog.
///
/// Listings are alphabetical by name.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn list_universities(&self) -> Result<Vec<UniversityWithCareers>, AppError>;

    async fn find_university(&self, id: i64) -> Result<Option<University>, AppError>;

    async fn list_careers(&self) -> Result<Vec<Career>, AppError>;

    async fn careers_of(&self, university_id: i64) -> Result<Vec<Career>, AppError>;

    async fn find_career(&self, id: i64) -> Result<Option<Career>, AppError>;

    async fn create_university(&self, name: &str) -> Result<University, AppError>;

    async fn create_career(&self, university_id: i64, name: &str) -> Result<Career, AppError>;
}
