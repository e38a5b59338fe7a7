use crate::model::{ChallengeId, ChallengeProgress, CodingChallenge};

use super::ProgressStore;

impl ProgressStore {
    /// Record an accepted solution for a challenge.
    ///
    /// Callers invoke this only after every test case passed; the store does no
    /// grading of its own. Returns `false` for an unknown challenge.
    pub fn submit_challenge(
        &mut self,
        challenge_id: &ChallengeId,
        code: impl Into<String>,
        time_taken_secs: f64,
    ) -> bool {
        if self.catalog.challenge(challenge_id).is_none() {
            return false;
        }
        let now = self.clock.now();
        self.state
            .challenge_progress
            .entry(challenge_id.clone())
            .or_insert_with(|| ChallengeProgress::new(challenge_id.clone()))
            .record_success(code.into(), time_taken_secs, now);
        true
    }

    /// Progress for a challenge, or the zero-valued record if never solved.
    #[must_use]
    pub fn challenge_progress(&self, challenge_id: &ChallengeId) -> ChallengeProgress {
        self.state
            .challenge_progress
            .get(challenge_id)
            .cloned()
            .unwrap_or_else(|| ChallengeProgress::new(challenge_id.clone()))
    }

    fn is_challenge_completed(&self, challenge_id: &ChallengeId) -> bool {
        self.state
            .challenge_progress
            .get(challenge_id)
            .is_some_and(ChallengeProgress::is_completed)
    }

    /// Challenge `k` opens once challenge `k - 1` is solved; challenge 1 is
    /// always open. Unknown challenges are locked.
    #[must_use]
    pub fn is_challenge_unlocked(&self, challenge_id: &ChallengeId) -> bool {
        let Some(challenge) = self.catalog.challenge(challenge_id) else {
            return false;
        };
        if challenge.order() <= 1 {
            return true;
        }
        self.catalog
            .challenge_by_order(challenge.order() - 1)
            .is_some_and(|previous| self.is_challenge_completed(previous.id()))
    }

    /// The challenge after `challenge_id` in global order, if it is unlocked.
    #[must_use]
    pub fn next_challenge(&self, challenge_id: &ChallengeId) -> Option<&CodingChallenge> {
        let current = self.catalog.challenge(challenge_id)?;
        let next = self.catalog.challenge_by_order(current.order() + 1)?;
        self.is_challenge_unlocked(next.id()).then_some(next)
    }

    /// Number of solved challenges.
    #[must_use]
    pub fn completed_challenges(&self) -> usize {
        self.state
            .challenge_progress
            .values()
            .filter(|p| p.is_completed())
            .count()
    }

    /// Points earned across solved challenges still present in the catalog.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.state
            .challenge_progress
            .values()
            .filter(|p| p.is_completed())
            .filter_map(|p| self.catalog.challenge(p.challenge_id()))
            .map(CodingChallenge::points)
            .sum()
    }
}
