//! University and career catalog backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Career, DirectoryRepository, University, UniversityWithCareers};
use crate::infrastructure::database::{is_foreign_key_violation, is_unique_violation};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct UniversityRow {
    id: i64,
    name: String,
}

impl From<UniversityRow> for University {
    fn from(row: UniversityRow) -> Self {
        University {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CareerRow {
    id: i64,
    name: String,
    university_id: i64,
}

impl From<CareerRow> for Career {
    fn from(row: CareerRow) -> Self {
        Career {
            id: row.id,
            name: row.name,
            university_id: row.university_id,
        }
    }
}

#[derive(Clone)]
pub struct PgDirectoryRepository {
    pool: PgPool,
}

impl PgDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    async fn list_universities(&self) -> Result<Vec<UniversityWithCareers>, AppError> {
        let universities = sqlx::query_as::<_, UniversityRow>(
            "SELECT id, name FROM universities ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let careers = sqlx::query_as::<_, CareerRow>(
            "SELECT id, name, university_id FROM careers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result: Vec<UniversityWithCareers> = universities
            .into_iter()
            .map(|u| UniversityWithCareers {
                university: u.into(),
                careers: Vec::new(),
            })
            .collect();

        for career in careers {
            if let Some(entry) = result
                .iter_mut()
                .find(|u| u.university.id == career.university_id)
            {
                entry.careers.push(career.into());
            }
        }

        Ok(result)
    }

    async fn find_university(&self, id: i64) -> Result<Option<University>, AppError> {
        let row = sqlx::query_as::<_, UniversityRow>("SELECT id, name FROM universities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_careers(&self) -> Result<Vec<Career>, AppError> {
        let rows = sqlx::query_as::<_, CareerRow>(
            "SELECT id, name, university_id FROM careers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn careers_of(&self, university_id: i64) -> Result<Vec<Career>, AppError> {
        let rows = sqlx::query_as::<_, CareerRow>(
            r#"
            SELECT id, name, university_id
            FROM careers
            WHERE university_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(university_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_career(&self, id: i64) -> Result<Option<Career>, AppError> {
        let row = sqlx::query_as::<_, CareerRow>(
            "SELECT id, name, university_id FROM careers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create_university(&self, name: &str) -> Result<University, AppError> {
        let row = sqlx::query_as::<_, UniversityRow>(
            "INSERT INTO universities (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::BadRequest("University already exists".into())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(row.into())
    }

    async fn create_career(&self, university_id: i64, name: &str) -> Result<Career, AppError> {
        let row = sqlx::query_as::<_, CareerRow>(
            r#"
            INSERT INTO careers (university_id, name)
            VALUES ($1, $2)
            RETURNING id, name, university_id
            "#,
        )
        .bind(university_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::BadRequest("Career already exists for this university".into())
            } else if is_foreign_key_violation(&e) {
                AppError::NotFound("University not found".into())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(row.into())
    }
}
