use std::sync::Arc;

use bcrypt::{DEFAULT_COST, hash, verify};

use course_core::Clock;
use course_core::model::{User, UserId, normalize_email};
use storage::repository::{AccountRecord, AccountRepository, StorageError};

use crate::error::AccountError;
use crate::progress_service::ProgressService;

/// Local sign-up and sign-in.
///
/// Accounts live in an [`AccountRepository`]; who is signed in is part of the
/// learner blob owned by [`ProgressService`], so auth changes are persisted
/// with the same snapshot as progress.
#[derive(Clone)]
pub struct AccountService {
    clock: Clock,
    hash_cost: u32,
    progress: ProgressService,
    accounts: Arc<dyn AccountRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(clock: Clock, progress: ProgressService, accounts: Arc<dyn AccountRepository>) -> Self {
        Self {
            clock,
            hash_cost: DEFAULT_COST,
            progress,
            accounts,
        }
    }

    /// Override the bcrypt cost used for new accounts (usually to speed up tests).
    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Register a new account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyPassword` for a blank password,
    /// `AccountError::User` for an invalid email or name,
    /// `AccountError::EmailTaken` if the email is registered,
    /// `AccountError::Hashing` if the password cannot be hashed, or
    /// `AccountError::Storage` if the account cannot be written.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<User, AccountError> {
        if password.trim().is_empty() {
            return Err(AccountError::EmptyPassword);
        }
        let user = User::new(UserId::generate(), email, name, None)?;
        let record = AccountRecord {
            user: user.clone(),
            password_hash: hash(password, self.hash_cost)?,
            created_at: self.clock.now(),
        };

        match self.accounts.insert_account(&record).await {
            Ok(()) => {}
            Err(StorageError::Conflict) => return Err(AccountError::EmailTaken),
            Err(err) => return Err(err.into()),
        }

        tracing::info!(user_id = %user.id(), "account created");
        self.progress.sign_in(user.clone()).await;
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` when the email is unknown or
    /// the password does not match, `AccountError::Hashing` for a corrupt
    /// stored hash, or `AccountError::Storage` on lookup failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let email = normalize_email(email).map_err(|_| AccountError::InvalidCredentials)?;
        let Some(record) = self.accounts.find_account_by_email(&email).await? else {
            return Err(AccountError::InvalidCredentials);
        };
        if !verify(password, &record.password_hash)? {
            tracing::debug!(user_id = %record.user.id(), "password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        tracing::info!(user_id = %record.user.id(), "signed in");
        self.progress.sign_in(record.user.clone()).await;
        Ok(record.user)
    }

    /// Sign out and drop any test in progress. Lesson and challenge progress
    /// stay on the device.
    pub async fn logout(&self) {
        self.progress.sign_out().await;
        tracing::info!("signed out");
    }

    pub async fn current_user(&self) -> Option<User> {
        self.progress.auth().await.current_user().cloned()
    }
}
