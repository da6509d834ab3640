use std::sync::Arc;

use storage::repository::Storage;
use storage::seed;
use training_core::model::Catalog;
use training_core::progression::CompletionPolicy;

use crate::Clock;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::session::SignInService;

/// Assembles app-facing services over one catalog and storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    sign_in: Arc<SignInService>,
    progress: Arc<ProgressService>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Build services over the built-in catalog and seeded in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the built-in catalog is invalid.
    pub fn seeded(clock: Clock, policy: CompletionPolicy) -> Result<Self, AppServicesError> {
        let catalog = seed::default_catalog()?;
        let storage = Storage::seeded(&catalog);
        Ok(Self::new(clock, policy, catalog, &storage))
    }

    #[must_use]
    pub fn new(
        clock: Clock,
        policy: CompletionPolicy,
        catalog: Catalog,
        storage: &Storage,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let sign_in = Arc::new(SignInService::new(Arc::clone(&storage.learners)));
        let progress =
            Arc::new(ProgressService::new(clock, Arc::clone(&catalog)).with_policy(policy));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&catalog),
            Arc::clone(&storage.learners),
            Arc::clone(&storage.departments),
        ));

        Self {
            catalog,
            sign_in,
            progress,
            dashboard,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn sign_in(&self) -> Arc<SignInService> {
        Arc::clone(&self.sign_in)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
