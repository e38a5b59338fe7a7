use course_core::model::{
    AuthState, ChallengeId, ChallengeProgress, LessonId, LessonProgress, Score, TestKind, User,
    UserId,
};
use course_core::ProgressState;
use course_core::time::fixed_now;
use storage::repository::{
    AccountRecord, AccountRepository, PersistedState, STATE_KEY, StateRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn student() -> User {
    User::new(UserId::generate(), "student@example.com", "Student", None).unwrap()
}

fn sample_state() -> PersistedState {
    let now = fixed_now();
    let mut lesson = LessonProgress::new(LessonId::new("intro-cpp"));
    lesson.mark_started(now);
    lesson.record_test(TestKind::Pre, Score::try_from(33).unwrap(), now);

    let mut challenge = ChallengeProgress::new(ChallengeId::new("hello-world"));
    challenge.record_success("int main() { return 0; }".into(), 61.5, now);

    let mut progress = ProgressState::default();
    progress
        .lesson_progress
        .insert(lesson.lesson_id().clone(), lesson);
    progress
        .challenge_progress
        .insert(challenge.challenge_id().clone(), challenge);

    PersistedState::from_parts(&AuthState::signed_in(student()), progress)
}

#[tokio::test]
async fn sqlite_roundtrips_state_blob() {
    let repo = connect("memdb_state_roundtrip").await;
    assert!(repo.load_state(STATE_KEY).await.unwrap().is_none());

    let state = sample_state();
    repo.save_state(STATE_KEY, &state).await.unwrap();
    let loaded = repo.load_state(STATE_KEY).await.unwrap().expect("state");
    assert_eq!(loaded, state);

    let lesson = &loaded.lesson_progress[&LessonId::new("intro-cpp")];
    assert!(lesson.pre_test_completed());
    assert!(!lesson.is_completed());
    assert_eq!(lesson.started_at(), Some(fixed_now()));
}

#[tokio::test]
async fn sqlite_save_overwrites_previous_blob() {
    let repo = connect("memdb_state_overwrite").await;
    repo.save_state(STATE_KEY, &sample_state()).await.unwrap();

    let signed_out = PersistedState::default();
    repo.save_state(STATE_KEY, &signed_out).await.unwrap();

    let loaded = repo.load_state(STATE_KEY).await.unwrap().expect("state");
    assert!(!loaded.auth().is_authenticated());
    assert!(loaded.lesson_progress.is_empty());

    repo.clear_state(STATE_KEY).await.unwrap();
    assert!(repo.load_state(STATE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_rejects_malformed_blob() {
    let repo = connect("memdb_state_malformed").await;
    sqlx::query("INSERT INTO app_state (key, value, updated_at) VALUES (?1, ?2, ?3)")
        .bind(STATE_KEY)
        .bind("{\"lessonProgress\": 7}")
        .bind(fixed_now())
        .execute(repo.pool())
        .await
        .unwrap();

    let err = repo.load_state(STATE_KEY).await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn sqlite_accounts_conflict_on_duplicate_email() {
    let repo = connect("memdb_accounts").await;
    let record = AccountRecord {
        user: student(),
        password_hash: "abc123".into(),
        created_at: fixed_now(),
    };
    repo.insert_account(&record).await.unwrap();

    let found = repo
        .find_account_by_email("student@example.com")
        .await
        .unwrap()
        .expect("account");
    assert_eq!(found, record);

    let again = AccountRecord {
        user: User::new(UserId::generate(), "student@example.com", "Other", None).unwrap(),
        ..record
    };
    let err = repo.insert_account(&again).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    assert!(
        repo.find_account_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}
