use std::sync::Arc;

use course_core::model::Catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::error::AppServicesError;
use crate::grading::{ChallengeService, Grader};
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend and catalog.
#[derive(Clone)]
pub struct AppServices {
    progress: ProgressService,
    accounts: Arc<AccountService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Arc<Catalog>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock, catalog).await)
    }

    /// Build services over an already constructed storage bundle, restoring
    /// any persisted learner state.
    pub async fn with_storage(storage: Storage, clock: Clock, catalog: Arc<Catalog>) -> Self {
        let progress = ProgressService::load(catalog, clock, Arc::clone(&storage.state)).await;
        let accounts = Arc::new(AccountService::new(
            clock,
            progress.clone(),
            Arc::clone(&storage.accounts),
        ));
        Self { progress, accounts }
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    /// Challenge runner over the given grader.
    #[must_use]
    pub fn challenges(&self, grader: Arc<dyn Grader>) -> ChallengeService {
        ChallengeService::new(self.progress.clone(), grader)
    }
}
