//! Directory Service
//!
//! Universities, careers and the tag catalog.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Career, DirectoryRepository, Tag, TagRepository, University, UniversityWithCareers,
    DEFAULT_TAGS,
};
use crate::shared::error::AppError;

#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn universities(&self) -> Result<Vec<UniversityWithCareers>, DirectoryError>;

    async fn university(&self, id: i64) -> Result<UniversityWithCareers, DirectoryError>;

    async fn careers_of(&self, university_id: i64) -> Result<Vec<Career>, DirectoryError>;

    async fn careers(&self) -> Result<Vec<Career>, DirectoryError>;

    async fn career(&self, id: i64) -> Result<Career, DirectoryError>;

    async fn create_university(&self, name: &str) -> Result<University, DirectoryError>;

    async fn create_career(&self, university_id: i64, name: &str)
        -> Result<Career, DirectoryError>;

    /// All tags, seeding the defaults into an empty catalog first
    async fn tags(&self) -> Result<Vec<Tag>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("University not found")]
    UniversityNotFound,

    #[error("Career not found")]
    CareerNotFound,

    #[error("Name is required")]
    EmptyName,

    #[error(transparent)]
    Repository(#[from] AppError),
}

pub struct DirectoryServiceImpl<D, T>
where
    D: DirectoryRepository,
    T: TagRepository,
{
    directory_repo: Arc<D>,
    tag_repo: Arc<T>,
}

impl<D, T> DirectoryServiceImpl<D, T>
where
    D: DirectoryRepository,
    T: TagRepository,
{
    pub fn new(directory_repo: Arc<D>, tag_repo: Arc<T>) -> Self {
        Self {
            directory_repo,
            tag_repo,
        }
    }

    async fn existing_university(&self, id: i64) -> Result<University, DirectoryError> {
        self.directory_repo
            .find_university(id)
            .await?
            .ok_or(DirectoryError::UniversityNotFound)
    }
}

fn required(name: &str) -> Result<&str, DirectoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DirectoryError::EmptyName);
    }
    Ok(name)
}

#[async_trait]
impl<D, T> DirectoryService for DirectoryServiceImpl<D, T>
where
    D: DirectoryRepository + 'static,
    T: TagRepository + 'static,
{
    async fn universities(&self) -> Result<Vec<UniversityWithCareers>, DirectoryError> {
        Ok(self.directory_repo.list_universities().await?)
    }

    async fn university(&self, id: i64) -> Result<UniversityWithCareers, DirectoryError> {
        let university = self.existing_university(id).await?;
        let careers = self.directory_repo.careers_of(id).await?;
        Ok(UniversityWithCareers {
            university,
            careers,
        })
    }

    async fn careers_of(&self, university_id: i64) -> Result<Vec<Career>, DirectoryError> {
        self.existing_university(university_id).await?;
        Ok(self.directory_repo.careers_of(university_id).await?)
    }

    async fn careers(&self) -> Result<Vec<Career>, DirectoryError> {
        Ok(self.directory_repo.list_careers().await?)
    }

    async fn career(&self, id: i64) -> Result<Career, DirectoryError> {
        self.directory_repo
            .find_career(id)
            .await?
            .ok_or(DirectoryError::CareerNotFound)
    }

    async fn create_university(&self, name: &str) -> Result<University, DirectoryError> {
        let university = self.directory_repo.create_university(required(name)?).await?;
        tracing::info!(university_id = university.id, "University created");
        Ok(university)
    }

    async fn create_career(
        &self,
        university_id: i64,
        name: &str,
    ) -> Result<Career, DirectoryError> {
        let name = required(name)?;
        self.existing_university(university_id).await?;
        let career = self.directory_repo.create_career(university_id, name).await?;
        tracing::info!(career_id = career.id, university_id, "Career created");
        Ok(career)
    }

    async fn tags(&self) -> Result<Vec<Tag>, DirectoryError> {
        if self.tag_repo.count().await? == 0 {
            tracing::info!("Seeding default tags");
            self.tag_repo.insert_missing(&DEFAULT_TAGS).await?;
        }
        Ok(self.tag_repo.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    fn service(store: &Arc<MemoryStore>) -> DirectoryServiceImpl<MemoryStore, MemoryStore> {
        DirectoryServiceImpl::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_universities_are_alphabetical_with_careers() {
        let store = Arc::new(MemoryStore::default());
        let directory = service(&store);

        let utn = directory.create_university("UTN").await.unwrap();
        directory.create_university("UBA").await.unwrap();
        directory.create_career(utn.id, "Sistemas").await.unwrap();
        directory.create_career(utn.id, "Civil").await.unwrap();

        let all = directory.universities().await.unwrap();
        let names: Vec<&str> = all.iter().map(|u| u.university.name.as_str()).collect();
        assert_eq!(names, vec!["UBA", "UTN"]);

        let careers: Vec<String> = directory
            .careers_of(utn.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(careers, vec!["Civil", "Sistemas"]);
    }

    #[tokio::test]
    async fn test_missing_entries_are_not_found() {
        let store = Arc::new(MemoryStore::default());
        let directory = service(&store);

        assert!(matches!(
            directory.university(5).await,
            Err(DirectoryError::UniversityNotFound)
        ));
        assert!(matches!(
            directory.careers_of(5).await,
            Err(DirectoryError::UniversityNotFound)
        ));
        assert!(matches!(directory.career(5).await, Err(DirectoryError::CareerNotFound)));
        assert!(matches!(
            directory.create_career(5, "Medicina").await,
            Err(DirectoryError::UniversityNotFound)
        ));
        assert!(matches!(
            directory.create_university("  ").await,
            Err(DirectoryError::EmptyName)
        ));
    }

    #[tokio::test]
    async fn test_tags_seed_once() {
        let store = Arc::new(MemoryStore::default());
        let directory = service(&store);

        let first = directory.tags().await.unwrap();
        assert_eq!(first.len(), DEFAULT_TAGS.len());
        assert_eq!(first[0].name, "Apuntes");

        let second = directory.tags().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_existing_tags_skip_seeding() {
        let store = Arc::new(MemoryStore::default());
        store.insert_missing(&["Propio"]).await.unwrap();
        let directory = service(&store);

        let tags = directory.tags().await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Propio");
    }
}
