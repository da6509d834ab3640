//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use training_core::model::CatalogError;
use training_core::progression::ProgressError;

/// Errors emitted by `SignInService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignInError {
    /// Shown to the learner as-is.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for SignInError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::InvalidCredentials,
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("no learner is signed in")]
    NotSignedIn,
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error("the admin overview requires an admin learner")]
    Forbidden,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
