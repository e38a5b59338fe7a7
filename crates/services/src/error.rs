//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CatalogError, UserError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure reported by a `Grader` implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GradingError {
    #[error("grader is unavailable: {0}")]
    Unavailable(String),
    #[error("grader rejected the submission: {0}")]
    Rejected(String),
}

/// Errors emitted by `ChallengeService::run`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChallengeRunError {
    #[error("submitted code is empty")]
    EmptyCode,
    #[error(transparent)]
    Grading(#[from] GradingError),
}

/// Failure reported by a `Tutor` or while decoding its reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TutorError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("tutor is unavailable: {0}")]
    Unavailable(String),
    #[error("tutor reply is not valid JSON: {0}")]
    MalformedReply(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
