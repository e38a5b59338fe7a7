use thiserror::Error;
use url::Url;

use crate::model::ids::{LessonId, QuestionId, SectionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {0} has an empty prompt")]
    EmptyPrompt(QuestionId),

    #[error("question {id} needs at least two options, got {count}")]
    TooFewOptions { id: QuestionId, count: usize },

    #[error("question {id} marks option {index} correct but only has {count} options")]
    CorrectAnswerOutOfRange {
        id: QuestionId,
        index: usize,
        count: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson {0} has an empty title")]
    EmptyTitle(LessonId),

    #[error("lesson {id} has an invalid video url: {raw}")]
    InvalidVideoUrl { id: LessonId, raw: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Multiple-choice question used in pre- and post-tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: Option<String>,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two options
    /// are given, or `correct_answer` does not index into `options`.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt(id));
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                id,
                count: options.len(),
            });
        }
        if correct_answer >= options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                id,
                index: correct_answer,
                count: options.len(),
            });
        }

        Ok(Self {
            id,
            prompt: prompt.trim().to_owned(),
            options,
            correct_answer,
            explanation: explanation
                .map(|e| e.trim().to_owned())
                .filter(|e| !e.is_empty()),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        selected == Some(self.correct_answer)
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Unvalidated lesson fields, as written in the course data.
#[derive(Debug, Clone, Default)]
pub struct LessonDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    pub estimated_minutes: u32,
    pub order: u32,
    pub section_id: String,
    pub pre_test: Vec<Question>,
    pub post_test: Vec<Question>,
}

impl LessonDraft {
    /// Validate the draft into a catalog lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the title is blank or the video url does not parse.
    pub fn validate(self) -> Result<Lesson, LessonError> {
        let id = LessonId::new(self.id);
        if self.title.trim().is_empty() {
            return Err(LessonError::EmptyTitle(id));
        }

        let video_url = match self
            .video_url
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
        {
            Some(raw) => Some(
                Url::parse(&raw).map_err(|_| LessonError::InvalidVideoUrl {
                    id: id.clone(),
                    raw,
                })?,
            ),
            None => None,
        };

        Ok(Lesson {
            id,
            title: self.title.trim().to_owned(),
            description: self.description,
            content: self.content,
            video_url,
            estimated_minutes: self.estimated_minutes,
            order: self.order,
            section_id: SectionId::new(self.section_id),
            pre_test: self.pre_test,
            post_test: self.post_test,
        })
    }
}

/// A single lesson with its long-form content and its two tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    content: String,
    video_url: Option<Url>,
    estimated_minutes: u32,
    order: u32,
    section_id: SectionId,
    pre_test: Vec<Question>,
    post_test: Vec<Question>,
}

impl Lesson {
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }

    #[must_use]
    pub fn estimated_minutes(&self) -> u32 {
        self.estimated_minutes
    }

    /// Sort key within the owning section.
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn section_id(&self) -> &SectionId {
        &self.section_id
    }

    #[must_use]
    pub fn pre_test(&self) -> &[Question] {
        &self.pre_test
    }

    #[must_use]
    pub fn post_test(&self) -> &[Question] {
        &self.post_test
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
