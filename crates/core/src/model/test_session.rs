use chrono::{DateTime, Utc};

use crate::model::ids::{LessonId, QuestionId};
use crate::model::lesson::Question;
use crate::model::lesson_progress::{Score, TestKind};

//
// ─── TEST SESSION ──────────────────────────────────────────────────────────────
//

/// An in-flight pre- or post-test.
///
/// Answers are aligned to question order; unanswered questions stay `None`.
/// Recording an answer never moves the cursor and never submits the test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSession {
    lesson_id: LessonId,
    kind: TestKind,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<Option<usize>>,
    started_at: DateTime<Utc>,
}

impl TestSession {
    #[must_use]
    pub fn new(
        lesson_id: LessonId,
        kind: TestKind,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            lesson_id,
            kind,
            questions,
            current_index: 0,
            answers,
            started_at,
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn kind(&self) -> TestKind {
        self.kind
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.current_index).copied().flatten()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Select an option for the question under the cursor.
    ///
    /// Overwrites an earlier choice. Returns `false` without recording anything
    /// when there is no current question or the index is not one of its options.
    pub fn record_answer(&mut self, answer: usize) -> bool {
        let Some(question) = self.questions.get(self.current_index) else {
            return false;
        };
        if answer >= question.options().len() {
            return false;
        }
        self.answers[self.current_index] = Some(answer);
        true
    }

    /// Move to the next question, never past the last one.
    ///
    /// Returns `true` if the cursor moved.
    pub fn advance(&mut self) -> bool {
        if self.is_last_question() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Move back one question, stopping at the first.
    pub fn retreat(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Number of answers matching the question's correct option.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| question.is_correct(**answer))
            .count()
    }

    /// Pure scoring over the recorded answers; unanswered counts as wrong.
    #[must_use]
    pub fn score(&self) -> Score {
        Score::from_counts(self.correct_count(), self.questions.len())
    }

    /// Close the session and produce its result.
    #[must_use]
    pub fn into_result(self, completed_at: DateTime<Utc>) -> TestResult {
        TestResult {
            score: self.score(),
            correct_answers: self.correct_count(),
            total_questions: self.questions.len(),
            lesson_id: self.lesson_id,
            kind: self.kind,
            answers: self.answers,
            completed_at,
        }
    }
}

//
// ─── TEST RESULT ───────────────────────────────────────────────────────────────
//

/// Outcome of a submitted test, handed back to the caller once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub lesson_id: LessonId,
    pub kind: TestKind,
    pub score: Score,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub answers: Vec<Option<usize>>,
    pub completed_at: DateTime<Utc>,
}

/// Per-question breakdown shown after a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReview {
    pub question_id: QuestionId,
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

impl TestResult {
    /// Pair each recorded answer with the question it belongs to.
    #[must_use]
    pub fn review(&self, questions: &[Question]) -> Vec<AnswerReview> {
        questions
            .iter()
            .enumerate()
            .map(|(pos, question)| {
                let selected = self.answers.get(pos).copied().flatten();
                AnswerReview {
                    question_id: question.id().clone(),
                    selected,
                    correct_answer: question.correct_answer(),
                    is_correct: question.is_correct(selected),
                    explanation: question.explanation().map(str::to_owned),
                }
            })
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
