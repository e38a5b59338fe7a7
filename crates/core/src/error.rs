use thiserror::Error;

use crate::model::{CatalogError, ChallengeError, IdError, LessonError, QuestionError, UserError};

/// Any validation failure raised while building course data or accounts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Id(#[from] IdError),
}
