//! `SQLite` backend for the learner-state blob and local accounts.

use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{AccountRepository, StateRepository, Storage};

mod account_repo;
mod mapping;
mod migrate;
mod state_repo;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Applied to every pooled connection. Snapshot saves and account inserts
/// may overlap, so writers wait on the lock instead of failing.
const CONNECTION_PRAGMAS: [&str; 2] = ["PRAGMA journal_mode = WAL;", "PRAGMA busy_timeout = 5000;"];

/// Implements both [`StateRepository`] and [`AccountRepository`] over one pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open a connection pool for the progress database at `database_url`.
    ///
    /// Tables are not touched; call [`SqliteRepository::migrate`] before use.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or a
    /// connection pragma is rejected.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    for pragma in CONNECTION_PRAGMAS {
                        sqlx::query(pragma).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        tracing::debug!(url = database_url, "sqlite pool ready");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring `app_state` and `accounts` up to the latest schema version.
    /// Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a pending migration fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Open and migrate the progress database, sharing one pool between the
    /// state and account repositories.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let state: Arc<dyn StateRepository> = Arc::new(repo.clone());
        let accounts: Arc<dyn AccountRepository> = Arc::new(repo);
        Ok(Self { state, accounts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{PersistedState, STATE_KEY};

    #[tokio::test]
    async fn bundle_shares_one_migrated_database() {
        let storage = Storage::sqlite("sqlite:file:bundle_test?mode=memory&cache=shared")
            .await
            .unwrap();
        assert!(storage.state.load_state(STATE_KEY).await.unwrap().is_none());
        assert!(
            storage
                .accounts
                .find_account_by_email("nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );

        storage
            .state
            .save_state(STATE_KEY, &PersistedState::default())
            .await
            .unwrap();
        let loaded = storage.state.load_state(STATE_KEY).await.unwrap();
        assert_eq!(loaded, Some(PersistedState::default()));
    }
}
