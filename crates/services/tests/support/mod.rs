#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use course_core::model::{
    Catalog, ChallengeDraft, ChallengeId, Difficulty, LessonDraft, LessonId, Question, QuestionId,
    Section, SectionId, TestCase, TestKind,
};
use services::ProgressService;
use storage::repository::{PersistedState, StateRepository, StorageError};

pub fn lesson_id(id: &str) -> LessonId {
    LessonId::new(id)
}

pub fn challenge_id(id: &str) -> ChallengeId {
    ChallengeId::new(id)
}

fn questions(prefix: &str, correct: &[usize]) -> Vec<Question> {
    correct
        .iter()
        .enumerate()
        .map(|(i, &answer)| {
            Question::new(
                QuestionId::new(format!("{prefix}-{i}")),
                format!("{prefix} question {i}"),
                vec!["a".into(), "b".into(), "c".into()],
                answer,
                None,
            )
            .unwrap()
        })
        .collect()
}

/// One section with `first` and `second`; challenges `hello` (1) and `sum` (2).
pub fn catalog() -> Arc<Catalog> {
    let lesson = |id: &str, order: u32| {
        LessonDraft {
            id: id.into(),
            title: format!("Lesson {id}"),
            content: format!("All about {id}"),
            estimated_minutes: 20,
            order,
            section_id: "basics".into(),
            pre_test: questions(&format!("{id}-pre"), &[0, 1]),
            post_test: questions(&format!("{id}-post"), &[2, 0]),
            ..LessonDraft::default()
        }
        .validate()
        .unwrap()
    };
    let challenge = |id: &str, order: u32, points: u32| {
        ChallengeDraft {
            id: id.into(),
            title: format!("Challenge {id}"),
            description: String::new(),
            difficulty: Difficulty::Easy,
            category: "Basics".into(),
            order,
            points,
            time_limit_minutes: 5,
            memory_limit: "64 MB".into(),
            starter_code: String::new(),
            solution: String::new(),
            test_cases: vec![TestCase::new("", "Hello, World!")],
            hints: Vec::new(),
            explanation: String::new(),
            concepts: Vec::new(),
        }
        .validate()
        .unwrap()
    };

    Arc::new(
        Catalog::new(
            vec![Section::new(SectionId::new("basics"), "Basics", "", "#3B82F6", 1)],
            vec![lesson("first", 1), lesson("second", 2)],
            vec![challenge("hello", 1, 10), challenge("sum", 2, 15)],
        )
        .unwrap(),
    )
}

/// Run a full test through the service, answering in order.
pub async fn take_test(service: &ProgressService, lesson: &str, kind: TestKind, answers: &[usize]) {
    assert!(service.start_test(&lesson_id(lesson), kind).await);
    for &answer in answers {
        assert!(service.record_answer(answer).await);
        service.advance_question().await;
    }
    assert!(service.submit_test().await.is_some());
}

/// Perfect pre- and post-test for a lesson.
pub async fn complete(service: &ProgressService, lesson: &str) {
    take_test(service, lesson, TestKind::Pre, &[0, 1]).await;
    take_test(service, lesson, TestKind::Post, &[2, 0]).await;
}

/// State repository whose every call fails.
pub struct BrokenRepository;

#[async_trait]
impl StateRepository for BrokenRepository {
    async fn load_state(&self, _key: &str) -> Result<Option<PersistedState>, StorageError> {
        Err(StorageError::Serialization("corrupt blob".into()))
    }

    async fn save_state(&self, _key: &str, _state: &PersistedState) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }

    async fn clear_state(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}
