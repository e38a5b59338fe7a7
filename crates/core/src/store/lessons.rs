use crate::model::{LessonId, LessonProgress, TestKind, TestResult, TestSession};

use super::ProgressStore;

impl ProgressStore {
    /// Make sure a progress record exists and carries a `started_at` stamp.
    ///
    /// Idempotent. Unknown lessons are ignored and return `false`.
    pub fn start_lesson(&mut self, lesson_id: &LessonId) -> bool {
        if self.catalog.lesson(lesson_id).is_none() {
            return false;
        }
        let now = self.clock.now();
        self.state
            .lesson_progress
            .entry(lesson_id.clone())
            .or_insert_with(|| LessonProgress::new(lesson_id.clone()))
            .mark_started(now);
        true
    }

    /// Begin a fresh pre- or post-test for a lesson.
    ///
    /// Any session already in flight is discarded without being scored.
    /// Returns `false` for an unknown lesson, leaving the current session alone.
    pub fn start_test(&mut self, lesson_id: &LessonId, kind: TestKind) -> bool {
        let Some(lesson) = self.catalog.lesson(lesson_id) else {
            return false;
        };
        let questions = match kind {
            TestKind::Pre => lesson.pre_test(),
            TestKind::Post => lesson.post_test(),
        };
        self.current_test = Some(TestSession::new(
            lesson_id.clone(),
            kind,
            questions.to_vec(),
            self.clock.now(),
        ));
        true
    }

    #[must_use]
    pub fn current_test(&self) -> Option<&TestSession> {
        self.current_test.as_ref()
    }

    /// Select an option for the current question of the live test.
    ///
    /// Never advances the cursor. Returns `false` when no test is running or
    /// the index is not a valid option.
    pub fn record_answer(&mut self, answer: usize) -> bool {
        self.current_test
            .as_mut()
            .is_some_and(|session| session.record_answer(answer))
    }

    /// Move the live test to its next question, clamped at the last one.
    pub fn advance_question(&mut self) -> bool {
        self.current_test.as_mut().is_some_and(TestSession::advance)
    }

    /// Step the live test back one question, clamped at the first one.
    pub fn previous_question(&mut self) -> bool {
        self.current_test.as_mut().is_some_and(TestSession::retreat)
    }

    /// Score the live test, record it on the lesson and end the session.
    ///
    /// Returns `None` when no test is running.
    pub fn submit_test(&mut self) -> Option<TestResult> {
        let session = self.current_test.take()?;
        let now = self.clock.now();
        let result = session.into_result(now);

        self.state
            .lesson_progress
            .entry(result.lesson_id.clone())
            .or_insert_with(|| LessonProgress::new(result.lesson_id.clone()))
            .record_test(result.kind, result.score, now);

        Some(result)
    }

    /// Re-stamp completion of a lesson whose two tests are both done.
    ///
    /// Returns `false` if the lesson has no record or is missing a test.
    pub fn complete_lesson(&mut self, lesson_id: &LessonId) -> bool {
        let now = self.clock.now();
        self.state
            .lesson_progress
            .get_mut(lesson_id)
            .is_some_and(|progress| progress.restamp_completion(now))
    }

    /// Progress for a lesson, or the zero-valued record if it was never touched.
    #[must_use]
    pub fn lesson_progress(&self, lesson_id: &LessonId) -> LessonProgress {
        self.state
            .lesson_progress
            .get(lesson_id)
            .cloned()
            .unwrap_or_else(|| LessonProgress::new(lesson_id.clone()))
    }

    /// A lesson is open if it comes first in its section or the lesson right
    /// before it (same section, by order) is completed. Unknown lessons are locked.
    #[must_use]
    pub fn is_lesson_unlocked(&self, lesson_id: &LessonId) -> bool {
        if self.catalog.lesson(lesson_id).is_none() {
            return false;
        }
        match self.catalog.previous_lesson(lesson_id) {
            None => true,
            Some(previous) => self
                .state
                .lesson_progress
                .get(previous.id())
                .is_some_and(LessonProgress::is_completed),
        }
    }
}
