use std::sync::Arc;

use tokio::sync::Mutex;

use course_core::model::{
    AuthState, Catalog, ChallengeId, ChallengeProgress, CodingChallenge, LessonId,
    LessonProgress, SectionId, TestKind, TestResult, TestSession, User,
};
use course_core::{Clock, ProgressCount, ProgressStats, ProgressStore};
use storage::repository::{PersistedState, STATE_KEY, StateRepository};

/// Everything that lives in the persisted blob, guarded together so a snapshot
/// never mixes auth from one command with progress from another.
pub(crate) struct LearnerState {
    pub(crate) store: ProgressStore,
    pub(crate) auth: AuthState,
}

/// Persistence-aware front for the [`ProgressStore`].
///
/// Every command runs against in-memory state first. Commands that change
/// persisted progress then write a full snapshot through the
/// [`StateRepository`]; a failed write is logged and otherwise ignored, so the
/// caller always sees the in-memory outcome.
#[derive(Clone)]
pub struct ProgressService {
    catalog: Arc<Catalog>,
    state: Arc<Mutex<LearnerState>>,
    repo: Arc<dyn StateRepository>,
}

impl ProgressService {
    /// Service with empty progress and nobody signed in.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, clock: Clock, repo: Arc<dyn StateRepository>) -> Self {
        let store = ProgressStore::new(Arc::clone(&catalog), clock);
        Self {
            catalog,
            state: Arc::new(Mutex::new(LearnerState {
                store,
                auth: AuthState::default(),
            })),
            repo,
        }
    }

    /// Service restored from the persisted blob.
    ///
    /// A missing blob starts fresh. An unreadable one is logged and also starts
    /// fresh; it is overwritten by the next successful save.
    pub async fn load(catalog: Arc<Catalog>, clock: Clock, repo: Arc<dyn StateRepository>) -> Self {
        let service = Self::new(catalog, clock, repo);
        match service.repo.load_state(STATE_KEY).await {
            Ok(Some(blob)) => {
                let mut state = service.state.lock().await;
                state.store.restore_state(blob.progress());
                state.auth = blob.auth();
                tracing::info!(
                    lessons = blob.lesson_progress.len(),
                    challenges = blob.challenge_progress.len(),
                    authenticated = state.auth.is_authenticated(),
                    "restored learner state"
                );
            }
            Ok(None) => tracing::debug!("no persisted learner state, starting fresh"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load learner state, starting fresh");
            }
        }
        service
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    async fn persist(&self, state: &LearnerState) {
        let blob = PersistedState::from_parts(&state.auth, state.store.export_state());
        if let Err(err) = self.repo.save_state(STATE_KEY, &blob).await {
            tracing::warn!(error = %err, "failed to persist learner state");
        }
    }

    //
    // ─── LESSONS ───────────────────────────────────────────────────────────────
    //

    pub async fn start_lesson(&self, lesson_id: &LessonId) -> bool {
        let mut state = self.state.lock().await;
        let started = state.store.start_lesson(lesson_id);
        if started {
            self.persist(&state).await;
        }
        started
    }

    pub async fn start_test(&self, lesson_id: &LessonId, kind: TestKind) -> bool {
        let started = self.state.lock().await.store.start_test(lesson_id, kind);
        if started {
            tracing::debug!(lesson = %lesson_id, %kind, "test started");
        }
        started
    }

    pub async fn record_answer(&self, answer: usize) -> bool {
        self.state.lock().await.store.record_answer(answer)
    }

    pub async fn advance_question(&self) -> bool {
        self.state.lock().await.store.advance_question()
    }

    pub async fn previous_question(&self) -> bool {
        self.state.lock().await.store.previous_question()
    }

    pub async fn abandon_test(&self) -> Option<TestSession> {
        self.state.lock().await.store.abandon_test()
    }

    pub async fn submit_test(&self) -> Option<TestResult> {
        let mut state = self.state.lock().await;
        let result = state.store.submit_test()?;
        tracing::info!(
            lesson = %result.lesson_id,
            kind = %result.kind,
            score = %result.score,
            "test submitted"
        );
        self.persist(&state).await;
        Some(result)
    }

    pub async fn complete_lesson(&self, lesson_id: &LessonId) -> bool {
        let mut state = self.state.lock().await;
        let completed = state.store.complete_lesson(lesson_id);
        if completed {
            self.persist(&state).await;
        }
        completed
    }

    //
    // ─── CHALLENGES ────────────────────────────────────────────────────────────
    //

    pub async fn submit_challenge(
        &self,
        challenge_id: &ChallengeId,
        code: impl Into<String>,
        time_taken_secs: f64,
    ) -> bool {
        let mut state = self.state.lock().await;
        let accepted = state
            .store
            .submit_challenge(challenge_id, code, time_taken_secs);
        if accepted {
            tracing::info!(challenge = %challenge_id, time_taken_secs, "challenge solved");
            self.persist(&state).await;
        }
        accepted
    }

    //
    // ─── AUTH ──────────────────────────────────────────────────────────────────
    //

    pub(crate) async fn sign_in(&self, user: User) {
        let mut state = self.state.lock().await;
        state.auth = AuthState::signed_in(user);
        self.persist(&state).await;
    }

    /// Clear the signed-in user and drop any live test. Progress is kept.
    pub(crate) async fn sign_out(&self) {
        let mut state = self.state.lock().await;
        state.auth = AuthState::default();
        state.store.abandon_test();
        self.persist(&state).await;
    }

    pub async fn auth(&self) -> AuthState {
        self.state.lock().await.auth.clone()
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    /// Run a read-only query against the store.
    pub async fn read<R>(&self, query: impl FnOnce(&ProgressStore) -> R) -> R {
        query(&self.state.lock().await.store)
    }

    /// Current persisted view of the learner, as it would be written.
    pub async fn snapshot(&self) -> PersistedState {
        let state = self.state.lock().await;
        PersistedState::from_parts(&state.auth, state.store.export_state())
    }

    pub async fn current_test(&self) -> Option<TestSession> {
        self.read(|store| store.current_test().cloned()).await
    }

    pub async fn lesson_progress(&self, lesson_id: &LessonId) -> LessonProgress {
        self.read(|store| store.lesson_progress(lesson_id)).await
    }

    pub async fn challenge_progress(&self, challenge_id: &ChallengeId) -> ChallengeProgress {
        self.read(|store| store.challenge_progress(challenge_id))
            .await
    }

    pub async fn is_lesson_unlocked(&self, lesson_id: &LessonId) -> bool {
        self.read(|store| store.is_lesson_unlocked(lesson_id)).await
    }

    pub async fn is_challenge_unlocked(&self, challenge_id: &ChallengeId) -> bool {
        self.read(|store| store.is_challenge_unlocked(challenge_id))
            .await
    }

    pub async fn next_challenge(&self, challenge_id: &ChallengeId) -> Option<CodingChallenge> {
        self.read(|store| store.next_challenge(challenge_id).cloned())
            .await
    }

    pub async fn section_progress(&self, section_id: &SectionId) -> ProgressCount {
        self.read(|store| store.section_progress(section_id)).await
    }

    pub async fn overall_progress(&self) -> ProgressCount {
        self.read(ProgressStore::overall_progress).await
    }

    pub async fn completed_challenges(&self) -> usize {
        self.read(ProgressStore::completed_challenges).await
    }

    pub async fn total_points(&self) -> u32 {
        self.read(ProgressStore::total_points).await
    }

    pub async fn stats(&self) -> ProgressStats {
        self.read(ProgressStore::stats).await
    }
}
