mod catalog;
mod challenge;
mod challenge_progress;
mod ids;
mod lesson;
mod lesson_progress;
mod section;
mod test_session;
mod user;

pub use catalog::{Catalog, CatalogError};
pub use challenge::{ChallengeDraft, ChallengeError, CodingChallenge, Difficulty, TestCase};
pub use challenge_progress::ChallengeProgress;
pub use ids::{ChallengeId, IdError, LessonId, QuestionId, SectionId, UserId};
pub use lesson::{Lesson, LessonDraft, LessonError, Question, QuestionError};
pub use lesson_progress::{LessonProgress, LessonState, Score, ScoreError, TestKind};
pub use section::Section;
pub use test_session::{AnswerReview, TestResult, TestSession};
pub use user::{AuthState, User, UserError, normalize_email};
