//! Small course used by the store tests.

use std::sync::Arc;

use super::ProgressStore;
use crate::model::{
    Catalog, ChallengeDraft, ChallengeId, CodingChallenge, Difficulty, Lesson, LessonDraft,
    LessonId, Question, QuestionId, Section, SectionId, TestCase, TestKind,
};
use crate::time::fixed_clock;

pub(crate) fn lesson_id(id: &str) -> LessonId {
    LessonId::new(id)
}

pub(crate) fn challenge_id(id: &str) -> ChallengeId {
    ChallengeId::new(id)
}

pub(crate) fn questions(prefix: &str, correct: &[usize]) -> Vec<Question> {
    correct
        .iter()
        .enumerate()
        .map(|(i, &answer)| {
            Question::new(
                QuestionId::new(format!("{prefix}-{i}")),
                format!("{prefix} question {i}"),
                vec!["a".into(), "b".into(), "c".into(), "d".into()],
                answer,
                None,
            )
            .unwrap()
        })
        .collect()
}

pub(crate) fn lesson(id: &str, section: &str, order: u32, minutes: u32) -> Lesson {
    LessonDraft {
        id: id.into(),
        title: format!("Lesson {id}"),
        description: String::new(),
        content: format!("Content of {id}"),
        video_url: None,
        estimated_minutes: minutes,
        order,
        section_id: section.into(),
        pre_test: questions(&format!("{id}-pre"), &[1, 0, 2]),
        post_test: questions(&format!("{id}-post"), &[3, 1]),
    }
    .validate()
    .unwrap()
}

pub(crate) fn challenge(id: &str, order: u32, points: u32) -> CodingChallenge {
    ChallengeDraft {
        id: id.into(),
        title: format!("Challenge {id}"),
        description: String::new(),
        difficulty: Difficulty::Easy,
        category: "Basics".into(),
        order,
        points,
        time_limit_minutes: 10,
        memory_limit: "128 MB".into(),
        starter_code: "int main() {}".into(),
        solution: String::new(),
        test_cases: vec![TestCase::new("", "ok")],
        hints: Vec::new(),
        explanation: String::new(),
        concepts: Vec::new(),
    }
    .validate()
    .unwrap()
}

/// Two sections: `basics` (intro, variables, io) and `control` (loops, switch).
/// Challenges `hello` (1), `sum` (2), `max` (3).
pub(crate) fn catalog() -> Catalog {
    Catalog::new(
        vec![
            Section::new(SectionId::new("control"), "Control", "", "#10B981", 2),
            Section::new(SectionId::new("basics"), "Basics", "", "#3B82F6", 1),
        ],
        vec![
            lesson("variables", "basics", 2, 40),
            lesson("intro", "basics", 1, 30),
            lesson("io", "basics", 3, 25),
            lesson("loops", "control", 1, 45),
            lesson("switch", "control", 2, 35),
        ],
        vec![
            challenge("sum", 2, 15),
            challenge("hello", 1, 10),
            challenge("max", 3, 20),
        ],
    )
    .unwrap()
}

pub(crate) fn store() -> ProgressStore {
    ProgressStore::new(Arc::new(catalog()), fixed_clock())
}

/// Take and submit a test answering every question with `answers`.
pub(crate) fn take_test(store: &mut ProgressStore, lesson: &str, kind: TestKind, answers: &[usize]) {
    assert!(store.start_test(&lesson_id(lesson), kind));
    for &answer in answers {
        store.record_answer(answer);
        store.advance_question();
    }
    assert!(store.submit_test().is_some());
}

/// Complete a lesson with a perfect pre- and post-test.
pub(crate) fn complete(store: &mut ProgressStore, lesson: &str) {
    take_test(store, lesson, TestKind::Pre, &[1, 0, 2]);
    take_test(store, lesson, TestKind::Post, &[3, 1]);
}
