use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::LessonId;

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("score must be between 0 and 100, got {0}")]
pub struct ScoreError(u8);

/// Percentage of correctly answered questions, 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const PERFECT: Score = Score(100);

    /// `round(100 * correct / total)`, rounding halves up.
    ///
    /// A test without questions scores zero. `correct` is capped at `total`.
    #[must_use]
    pub fn from_counts(correct: usize, total: usize) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let correct = correct.min(total) as u128;
        let total = total as u128;
        let rounded = (200 * correct + total) / (2 * total);
        Self(u8::try_from(rounded).unwrap_or(100))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 100 {
            return Err(ScoreError(value));
        }
        Ok(Self(value))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

//
// ─── TEST KIND ─────────────────────────────────────────────────────────────────
//

/// Which of a lesson's two tests is being taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Pre,
    Post,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Pre => f.write_str("pre-test"),
            TestKind::Post => f.write_str("post-test"),
        }
    }
}

//
// ─── LESSON STATE ──────────────────────────────────────────────────────────────
//

/// Test completion state of a lesson.
///
/// A lesson is `Completed` exactly when both tests have a score, so the
/// completion flag can never disagree with the test flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LessonState {
    Untested,
    PreTestOnly {
        pre: Score,
    },
    PostTestOnly {
        post: Score,
    },
    Completed {
        pre: Score,
        post: Score,
        #[serde(rename = "completedAt")]
        completed_at: DateTime<Utc>,
    },
}

//
// ─── LESSON PROGRESS ───────────────────────────────────────────────────────────
//

/// Per-lesson learning record, created lazily on first interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    lesson_id: LessonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    state: LessonState,
}

impl LessonProgress {
    /// The zero-valued record for a lesson nobody has touched.
    #[must_use]
    pub fn new(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            started_at: None,
            state: LessonState::Untested,
        }
    }

    /// Stamp `started_at` unless it is already set.
    pub fn mark_started(&mut self, now: DateTime<Utc>) {
        self.started_at.get_or_insert(now);
    }

    /// Apply a submitted test score.
    ///
    /// Retaking a test overwrites its previous score. Whenever both scores are
    /// present after the update, `completed_at` is stamped with `now`.
    pub fn record_test(&mut self, kind: TestKind, score: Score, now: DateTime<Utc>) {
        let (pre, post) = match kind {
            TestKind::Pre => (Some(score), self.post_test_score()),
            TestKind::Post => (self.pre_test_score(), Some(score)),
        };

        self.state = match (pre, post) {
            (Some(pre), Some(post)) => LessonState::Completed {
                pre,
                post,
                completed_at: now,
            },
            (Some(pre), None) => LessonState::PreTestOnly { pre },
            (None, Some(post)) => LessonState::PostTestOnly { post },
            (None, None) => LessonState::Untested,
        };
    }

    /// Re-stamp `completed_at` on an already completed lesson.
    ///
    /// Returns `false` (and changes nothing) unless both tests are done.
    pub fn restamp_completion(&mut self, now: DateTime<Utc>) -> bool {
        match &mut self.state {
            LessonState::Completed { completed_at, .. } => {
                *completed_at = now;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn state(&self) -> LessonState {
        self.state
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn pre_test_score(&self) -> Option<Score> {
        match self.state {
            LessonState::PreTestOnly { pre } | LessonState::Completed { pre, .. } => Some(pre),
            _ => None,
        }
    }

    #[must_use]
    pub fn post_test_score(&self) -> Option<Score> {
        match self.state {
            LessonState::PostTestOnly { post } | LessonState::Completed { post, .. } => Some(post),
            _ => None,
        }
    }

    #[must_use]
    pub fn pre_test_completed(&self) -> bool {
        self.pre_test_score().is_some()
    }

    #[must_use]
    pub fn post_test_completed(&self) -> bool {
        self.post_test_score().is_some()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.state, LessonState::Completed { .. })
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            LessonState::Completed { completed_at, .. } => Some(completed_at),
            _ => None,
        }
    }

    /// Post-test score minus pre-test score, in percentage points.
    #[must_use]
    pub fn improvement(&self) -> Option<i16> {
        match self.state {
            LessonState::Completed { pre, post, .. } => {
                Some(i16::from(post.value()) - i16::from(pre.value()))
            }
            _ => None,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn score_rounds_half_up() {
        assert_eq!(Score::from_counts(2, 3).value(), 67);
        assert_eq!(Score::from_counts(1, 3).value(), 33);
        assert_eq!(Score::from_counts(1, 2).value(), 50);
        assert_eq!(Score::from_counts(1, 8).value(), 13);
        assert_eq!(Score::from_counts(3, 3), Score::PERFECT);
    }

    #[test]
    fn empty_test_scores_zero() {
        assert_eq!(Score::from_counts(0, 0), Score::ZERO);
    }

    #[test]
    fn score_rejects_values_above_hundred() {
        assert!(Score::try_from(101).is_err());
        assert!(serde_json::from_str::<Score>("150").is_err());
    }

    #[test]
    fn completes_only_after_both_tests() {
        let now = fixed_now();
        let mut progress = LessonProgress::new(LessonId::new("intro-cpp"));
        assert!(!progress.is_completed());

        progress.record_test(TestKind::Post, Score::try_from(80).unwrap(), now);
        assert!(progress.post_test_completed());
        assert!(!progress.pre_test_completed());
        assert!(!progress.is_completed());

        progress.record_test(TestKind::Pre, Score::try_from(40).unwrap(), now);
        assert!(progress.is_completed());
        assert_eq!(progress.completed_at(), Some(now));
        assert_eq!(progress.improvement(), Some(40));
    }

    #[test]
    fn retake_overwrites_score_and_restamps() {
        let now = fixed_now();
        let later = now + Duration::hours(2);
        let mut progress = LessonProgress::new(LessonId::new("variables"));
        progress.record_test(TestKind::Pre, Score::try_from(50).unwrap(), now);
        progress.record_test(TestKind::Post, Score::try_from(60).unwrap(), now);
        progress.record_test(TestKind::Post, Score::try_from(90).unwrap(), later);

        assert_eq!(progress.post_test_score().map(Score::value), Some(90));
        assert_eq!(progress.completed_at(), Some(later));
    }

    #[test]
    fn mark_started_is_set_once() {
        let now = fixed_now();
        let mut progress = LessonProgress::new(LessonId::new("loops"));
        progress.mark_started(now);
        progress.mark_started(now + Duration::days(1));
        assert_eq!(progress.started_at(), Some(now));
    }

    #[test]
    fn restamp_requires_completion() {
        let now = fixed_now();
        let mut progress = LessonProgress::new(LessonId::new("loops"));
        progress.record_test(TestKind::Pre, Score::ZERO, now);
        assert!(!progress.restamp_completion(now));
        assert_eq!(progress.completed_at(), None);
    }

    #[test]
    fn serializes_with_status_tag() {
        let now = fixed_now();
        let mut progress = LessonProgress::new(LessonId::new("loops"));
        progress.record_test(TestKind::Pre, Score::try_from(70).unwrap(), now);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["lessonId"], "loops");
        assert_eq!(json["state"]["status"], "preTestOnly");
        assert_eq!(json["state"]["pre"], 70);

        let back: LessonProgress = serde_json::from_value(json).unwrap();
        assert_eq!(back, progress);
    }
}
