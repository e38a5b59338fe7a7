#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod error;
pub mod grading;
pub mod progress_service;
pub mod tutor;

pub use course_core::Clock;

pub use account_service::AccountService;
pub use app_services::AppServices;
pub use error::{AccountError, AppServicesError, ChallengeRunError, GradingError, TutorError};
pub use grading::{CaseVerdict, ChallengeRun, ChallengeService, Grader, GradingReport};
pub use progress_service::ProgressService;
pub use tutor::{
    ModelTutor, SuggestedQuestions, Tutor, TutorAnswer, TutorHelper, TutorModel, ViewScope,
    parse_tutor_reply,
};
