mod support;

use std::sync::Arc;

use chrono::Duration;
use course_core::Clock;
use course_core::model::{Score, TestKind};
use course_core::time::fixed_now;
use services::{AccountError, AppServices, ProgressService};
use storage::repository::{InMemoryRepository, STATE_KEY, StateRepository, Storage};

use support::{BrokenRepository, catalog, challenge_id, complete, lesson_id, take_test};

#[tokio::test]
async fn progress_survives_a_restart() {
    let repo = Arc::new(InMemoryRepository::new());
    let clock = Clock::fixed(fixed_now());

    let service = ProgressService::load(catalog(), clock, repo.clone()).await;
    assert!(!service.is_lesson_unlocked(&lesson_id("second")).await);
    assert!(service.start_lesson(&lesson_id("first")).await);
    complete(&service, "first").await;
    assert!(
        service
            .submit_challenge(&challenge_id("hello"), "int main() {}", 42.0)
            .await
    );

    let restarted = ProgressService::load(catalog(), clock, repo.clone()).await;
    let progress = restarted.lesson_progress(&lesson_id("first")).await;
    assert!(progress.is_completed());
    assert_eq!(progress.pre_test_score(), Some(Score::PERFECT));
    assert_eq!(progress.started_at(), Some(fixed_now()));
    assert!(restarted.is_lesson_unlocked(&lesson_id("second")).await);
    assert!(restarted.is_challenge_unlocked(&challenge_id("sum")).await);
    assert_eq!(restarted.total_points().await, 10);
    assert_eq!(restarted.overall_progress().await.percent(), 50);
}

#[tokio::test]
async fn live_test_is_never_persisted() {
    let repo = Arc::new(InMemoryRepository::new());
    let service = ProgressService::load(catalog(), Clock::fixed(fixed_now()), repo.clone()).await;

    service.start_lesson(&lesson_id("first")).await;
    assert!(service.start_test(&lesson_id("first"), TestKind::Pre).await);
    assert!(service.record_answer(1).await);

    let restarted = ProgressService::load(catalog(), Clock::fixed(fixed_now()), repo).await;
    assert!(restarted.current_test().await.is_none());
    assert!(!restarted.lesson_progress(&lesson_id("first")).await.pre_test_completed());
}

#[tokio::test]
async fn failed_writes_keep_in_memory_state() {
    let service =
        ProgressService::load(catalog(), Clock::fixed(fixed_now()), Arc::new(BrokenRepository))
            .await;

    take_test(&service, "first", TestKind::Pre, &[0, 2]).await;
    let progress = service.lesson_progress(&lesson_id("first")).await;
    assert_eq!(progress.pre_test_score().map(Score::value), Some(50));
    assert!(service.start_lesson(&lesson_id("first")).await);
}

#[tokio::test]
async fn unreadable_blob_starts_fresh_and_is_overwritten() {
    let repo = Arc::new(InMemoryRepository::new());
    let service =
        ProgressService::load(catalog(), Clock::fixed(fixed_now()), Arc::new(BrokenRepository))
            .await;
    assert_eq!(service.overall_progress().await.completed, 0);
    assert!(!service.auth().await.is_authenticated());

    let fresh = ProgressService::load(catalog(), Clock::fixed(fixed_now()), repo.clone()).await;
    complete(&fresh, "first").await;
    let saved = repo.load_state(STATE_KEY).await.unwrap().expect("saved");
    assert_eq!(saved, fresh.snapshot().await);
}

#[tokio::test]
async fn completion_is_restamped_by_the_latest_submission() {
    let repo = Arc::new(InMemoryRepository::new());
    let storage = Storage {
        state: repo.clone(),
        accounts: repo.clone(),
    };
    let app = AppServices::with_storage(storage, Clock::fixed(fixed_now()), catalog()).await;
    let service = app.progress();
    complete(service, "first").await;
    let first_stamp = service.lesson_progress(&lesson_id("first")).await.completed_at();

    let later = ProgressService::load(
        catalog(),
        Clock::fixed(fixed_now() + Duration::days(2)),
        repo.clone(),
    )
    .await;
    take_test(&later, "first", TestKind::Post, &[2, 1]).await;
    let progress = later.lesson_progress(&lesson_id("first")).await;
    assert_eq!(progress.post_test_score().map(Score::value), Some(50));
    assert!(progress.completed_at() > first_stamp);
    assert_eq!(later.stats().await.recently_completed, vec![lesson_id("first")]);
}

#[tokio::test]
async fn accounts_sign_in_and_out() {
    let repo = Arc::new(InMemoryRepository::new());
    let storage = Storage {
        state: repo.clone(),
        accounts: repo.clone(),
    };
    let app = AppServices::with_storage(storage, Clock::fixed(fixed_now()), catalog()).await;
    let accounts = app.accounts();

    let user = accounts
        .signup("Ada@Example.com", "hunter2", "Ada")
        .await
        .unwrap();
    assert_eq!(user.email(), "ada@example.com");
    assert_eq!(accounts.current_user().await, Some(user.clone()));
    assert!(repo.load_state(STATE_KEY).await.unwrap().unwrap().is_authenticated);

    let err = accounts
        .signup("ada@example.com", "other", "Ada Again")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::EmailTaken));

    assert!(app.progress().start_test(&lesson_id("first"), TestKind::Pre).await);
    accounts.logout().await;
    assert!(accounts.current_user().await.is_none());
    assert!(app.progress().current_test().await.is_none());
    let saved = repo.load_state(STATE_KEY).await.unwrap().unwrap();
    assert!(!saved.is_authenticated);
    assert!(saved.current_user.is_none());

    let err = accounts.login("ada@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, AccountError::InvalidCredentials));
    let err = accounts.login("nobody@example.com", "hunter2").await.unwrap_err();
    assert!(matches!(err, AccountError::InvalidCredentials));

    let again = accounts.login(" ADA@example.com ", "hunter2").await.unwrap();
    assert_eq!(again, user);
}

#[tokio::test]
async fn signup_rejects_blank_password() {
    let app = AppServices::with_storage(Storage::in_memory(), Clock::fixed(fixed_now()), catalog())
        .await;
    let err = app
        .accounts()
        .signup("a@example.com", "   ", "A")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::EmptyPassword));
    assert!(app.accounts().current_user().await.is_none());
}
