use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use training_core::model::{Catalog, DepartmentStats, Learner};

use crate::seed;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Directory of learners that can sign in.
#[async_trait]
pub trait LearnerRepository: Send + Sync {
    /// Fetch a learner by exact email match.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no learner has this email.
    async fn find_by_email(&self, email: &str) -> Result<Learner, StorageError>;

    /// All learners, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be read.
    async fn list_learners(&self) -> Result<Vec<Learner>, StorageError>;
}

/// Read-only department roll-ups for the admin overview.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the stats cannot be read.
    async fn list_departments(&self) -> Result<Vec<DepartmentStats>, StorageError>;
}

/// In-memory repository, populated from the seed set at startup.
#[derive(Clone)]
pub struct InMemoryRepository {
    learners: Arc<Mutex<HashMap<String, Learner>>>,
    departments: Arc<Mutex<Vec<DepartmentStats>>>,
}

impl InMemoryRepository {
    /// Repository holding the sample learners and department stats.
    #[must_use]
    pub fn seeded(catalog: &Catalog) -> Self {
        let learners = seed::sample_learners(catalog)
            .into_iter()
            .map(|learner| (learner.email().to_owned(), learner))
            .collect();
        Self {
            learners: Arc::new(Mutex::new(learners)),
            departments: Arc::new(Mutex::new(seed::department_stats())),
        }
    }
}

#[async_trait]
impl LearnerRepository for InMemoryRepository {
    async fn find_by_email(&self, email: &str) -> Result<Learner, StorageError> {
        let guard = self
            .learners
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(email).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_learners(&self) -> Result<Vec<Learner>, StorageError> {
        let guard = self
            .learners
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut learners: Vec<Learner> = guard.values().cloned().collect();
        learners.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(learners)
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryRepository {
    async fn list_departments(&self) -> Result<Vec<DepartmentStats>, StorageError> {
        let guard = self
            .departments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub learners: Arc<dyn LearnerRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
}

impl Storage {
    /// Storage pre-populated with the sample learners and departments.
    #[must_use]
    pub fn seeded(catalog: &Catalog) -> Self {
        let repo = InMemoryRepository::seeded(catalog);
        let learners: Arc<dyn LearnerRepository> = Arc::new(repo.clone());
        let departments: Arc<dyn DepartmentRepository> = Arc::new(repo);
        Self {
            learners,
            departments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        seed::default_catalog().unwrap()
    }

    #[tokio::test]
    async fn finds_seeded_learner_by_email() {
        let repo = InMemoryRepository::seeded(&catalog());
        let learner = repo.find_by_email("user@gennova.com").await.unwrap();
        assert_eq!(learner.name(), "Regular User");
        assert_eq!(learner.department(), "Production");
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let repo = InMemoryRepository::seeded(&catalog());
        let err = repo.find_by_email("nobody@gennova.com").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));

        // lookup is exact, like the sign-in form
        let err = repo.find_by_email("USER@gennova.com").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let repo = InMemoryRepository::seeded(&catalog());
        let ids: Vec<String> = repo
            .list_learners()
            .await
            .unwrap()
            .iter()
            .map(|l| l.id().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn seeded_storage_exposes_departments() {
        let storage = Storage::seeded(&catalog());
        let departments = storage.departments.list_departments().await.unwrap();
        assert_eq!(departments.len(), 5);
        assert_eq!(departments[1].department, "Quality Control");

        let admin = storage.learners.find_by_email("admin@gennova.com").await.unwrap();
        assert!(admin.is_admin());
    }
}
