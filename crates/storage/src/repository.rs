use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::ProgressState;
use course_core::model::{
    AuthState, ChallengeId, ChallengeProgress, LessonId, LessonProgress, User,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the learner's state blob is stored.
pub const STATE_KEY: &str = "learning-progress";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── PERSISTED STATE ───────────────────────────────────────────────────────────
//

/// The single blob written to device storage.
///
/// Holds who is signed in plus both progress maps. The live test session and
/// the course catalog are never part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub current_user: Option<User>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub lesson_progress: BTreeMap<LessonId, LessonProgress>,
    #[serde(default)]
    pub challenge_progress: BTreeMap<ChallengeId, ChallengeProgress>,
}

impl PersistedState {
    #[must_use]
    pub fn from_parts(auth: &AuthState, progress: ProgressState) -> Self {
        Self {
            current_user: auth.current_user().cloned(),
            is_authenticated: auth.is_authenticated(),
            lesson_progress: progress.lesson_progress,
            challenge_progress: progress.challenge_progress,
        }
    }

    /// Auth state implied by the blob. A set flag without a user is ignored.
    #[must_use]
    pub fn auth(&self) -> AuthState {
        match (&self.current_user, self.is_authenticated) {
            (Some(user), true) => AuthState::signed_in(user.clone()),
            _ => AuthState::default(),
        }
    }

    #[must_use]
    pub fn progress(&self) -> ProgressState {
        ProgressState {
            lesson_progress: self.lesson_progress.clone(),
            challenge_progress: self.challenge_progress.clone(),
        }
    }

    /// Encode as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Decode from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed or invalid blobs.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

//
// ─── ACCOUNTS ──────────────────────────────────────────────────────────────────
//

/// Stored account: public profile plus a bcrypt password hash (never the password).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub user: User,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Keyed blob storage for the persisted learner state.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Fetch the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob cannot be decoded.
    async fn load_state(&self, key: &str) -> Result<Option<PersistedState>, StorageError>;

    /// Overwrite the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be encoded or written.
    async fn save_state(&self, key: &str, state: &PersistedState) -> Result<(), StorageError>;

    /// Remove the blob stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn clear_state(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Look up an account by its normalized email.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn find_account_by_email(&self, email: &str)
    -> Result<Option<AccountRecord>, StorageError>;

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is already registered.
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
///
/// State blobs are kept as JSON text so they go through the same encoding as
/// the `SQLite` backend.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    states: Arc<Mutex<HashMap<String, String>>>,
    accounts: Arc<Mutex<HashMap<String, AccountRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateRepository for InMemoryRepository {
    async fn load_state(&self, key: &str) -> Result<Option<PersistedState>, StorageError> {
        let guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(key)
            .map(String::as_str)
            .map(PersistedState::from_json)
            .transpose()
    }

    async fn save_state(&self, key: &str, state: &PersistedState) -> Result<(), StorageError> {
        let raw = state.to_json()?;
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), raw);
        Ok(())
    }

    async fn clear_state(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let guard = self
            .accounts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(email).cloned())
    }

    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        let mut guard = self
            .accounts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(account.user.email()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(account.user.email().to_owned(), account.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub state: Arc<dyn StateRepository>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let state: Arc<dyn StateRepository> = Arc::new(repo.clone());
        let accounts: Arc<dyn AccountRepository> = Arc::new(repo);
        Self { state, accounts }
    }
}
