//! The progress store: single owner of all mutable learning state.
//!
//! Static course data comes in through a shared [`Catalog`]; lesson and
//! challenge progress plus the in-flight test live here and nowhere else.
//! Every operation is synchronous and reads only in-memory state; durability
//! is layered on top by the services crate through [`ProgressState`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{Catalog, ChallengeId, ChallengeProgress, LessonId, LessonProgress, TestSession};
use crate::time::Clock;

mod challenges;
mod lessons;
mod stats;

#[cfg(test)]
pub(crate) mod fixtures;

pub use stats::{ProgressCount, ProgressStats};

/// The persistable part of the store. The live test session is never included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub lesson_progress: BTreeMap<LessonId, LessonProgress>,
    #[serde(default)]
    pub challenge_progress: BTreeMap<ChallengeId, ChallengeProgress>,
}

pub struct ProgressStore {
    catalog: Arc<Catalog>,
    clock: Clock,
    state: ProgressState,
    current_test: Option<TestSession>,
}

impl ProgressStore {
    /// Create an empty store over the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, clock: Clock) -> Self {
        Self {
            catalog,
            clock,
            state: ProgressState::default(),
            current_test: None,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Replace the clock, e.g. to step a fixed clock forward in tests.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Copy of the progress maps for persistence.
    #[must_use]
    pub fn export_state(&self) -> ProgressState {
        self.state.clone()
    }

    /// Replace the progress maps with previously persisted ones.
    ///
    /// Records are re-keyed by their own ids so a hand-edited blob cannot make
    /// a map key disagree with the record it points to. Any in-flight test is
    /// dropped.
    pub fn restore_state(&mut self, state: ProgressState) {
        self.state = ProgressState {
            lesson_progress: state
                .lesson_progress
                .into_values()
                .map(|p| (p.lesson_id().clone(), p))
                .collect(),
            challenge_progress: state
                .challenge_progress
                .into_values()
                .map(|p| (p.challenge_id().clone(), p))
                .collect(),
        };
        self.current_test = None;
    }

    /// Drop the in-flight test without scoring it.
    pub fn abandon_test(&mut self) -> Option<TestSession> {
        self.current_test.take()
    }
}
