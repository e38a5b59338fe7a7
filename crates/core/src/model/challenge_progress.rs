use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ChallengeId;

/// Per-challenge practice record.
///
/// `attempts` counts accepted submissions only: a run that fails grading never
/// reaches the progress store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
    challenge_id: ChallengeId,
    is_completed: bool,
    attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    best_time_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_attempt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ChallengeProgress {
    #[must_use]
    pub fn new(challenge_id: ChallengeId) -> Self {
        Self {
            challenge_id,
            is_completed: false,
            attempts: 0,
            best_time_secs: None,
            completed_at: None,
            last_attempt: None,
            code: None,
        }
    }

    /// Record a submission that passed every test case.
    pub fn record_success(&mut self, code: String, time_taken_secs: f64, now: DateTime<Utc>) {
        let time_taken_secs = time_taken_secs.max(0.0);
        self.is_completed = true;
        self.attempts = self.attempts.saturating_add(1);
        self.best_time_secs = Some(match self.best_time_secs {
            Some(best) => best.min(time_taken_secs),
            None => time_taken_secs,
        });
        self.completed_at = Some(now);
        self.last_attempt = Some(now);
        self.code = Some(code);
    }

    #[must_use]
    pub fn challenge_id(&self) -> &ChallengeId {
        &self.challenge_id
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn best_time_secs(&self) -> Option<f64> {
        self.best_time_secs
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.last_attempt
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn keeps_best_time_across_submissions() {
        let now = fixed_now();
        let mut progress = ChallengeProgress::new(ChallengeId::new("factorial"));
        progress.record_success("v1".into(), 42.5, now);
        progress.record_success("v2".into(), 90.0, now + Duration::minutes(5));

        assert!(progress.is_completed());
        assert_eq!(progress.attempts(), 2);
        assert_eq!(progress.best_time_secs(), Some(42.5));
        assert_eq!(progress.code(), Some("v2"));
        assert_eq!(progress.last_attempt(), Some(now + Duration::minutes(5)));
    }

    #[test]
    fn default_record_is_zero_valued() {
        let progress = ChallengeProgress::new(ChallengeId::new("fibonacci"));
        assert!(!progress.is_completed());
        assert_eq!(progress.attempts(), 0);
        assert_eq!(progress.best_time_secs(), None);
        assert_eq!(progress.code(), None);
    }
}
