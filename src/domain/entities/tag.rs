use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

/// Tags offered when the catalog is empty.
pub const DEFAULT_TAGS: [&str; 15] = [
    "Apuntes",
    "Parciales",
    "Finales",
    "Clases",
    "Ejercicios",
    "Resúmenes",
    "Material de estudio",
    "Proyectos",
    "Trabajos prácticos",
    "Exámenes",
    "Guías",
    "Presentaciones",
    "Videos",
    "Libros",
    "Artículos",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn count(&self) -> Result<i64, AppError>;

    /// Insert names that are not present yet.
    async fn insert_missing(&self, names: &[&str]) -> Result<(), AppError>;

    /// All tags, alphabetical.
    async fn list(&self) -> Result<Vec<Tag>, AppError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, AppError>;
}
