use std::sync::Arc;

use async_trait::async_trait;

use course_core::model::{ChallengeId, CodingChallenge};

use crate::error::{ChallengeRunError, GradingError};
use crate::progress_service::ProgressService;

//
// ─── GRADER CONTRACT ───────────────────────────────────────────────────────────
//

/// Outcome for one test case of a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseVerdict {
    pub input: String,
    pub expected_output: String,
    pub actual_output: Option<String>,
    pub passed: bool,
}

/// Per-case verdicts for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradingReport {
    pub cases: Vec<CaseVerdict>,
}

impl GradingReport {
    #[must_use]
    pub fn new(cases: Vec<CaseVerdict>) -> Self {
        Self { cases }
    }

    /// True only when there is at least one case and every case passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.cases.is_empty() && self.cases.iter().all(|case| case.passed)
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|case| case.passed).count()
    }
}

/// Runs submitted code against a challenge's test cases.
///
/// Implementations may compile and execute in a sandbox or return canned
/// verdicts in tests. The progress store never grades on its own.
#[async_trait]
pub trait Grader: Send + Sync {
    /// Grade `code` against every test case of `challenge`.
    ///
    /// # Errors
    ///
    /// Returns `GradingError` when the grader cannot produce verdicts.
    async fn grade(
        &self,
        challenge: &CodingChallenge,
        code: &str,
    ) -> Result<GradingReport, GradingError>;
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Result of running a submission through the grader.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeRun {
    pub report: GradingReport,
    /// Whether the submission was recorded as a solve.
    pub accepted: bool,
    /// The challenge this solve unlocked, if any.
    pub next_challenge: Option<ChallengeId>,
}

/// Grades submissions and records passing ones on the learner's progress.
#[derive(Clone)]
pub struct ChallengeService {
    progress: ProgressService,
    grader: Arc<dyn Grader>,
}

impl ChallengeService {
    #[must_use]
    pub fn new(progress: ProgressService, grader: Arc<dyn Grader>) -> Self {
        Self { progress, grader }
    }

    /// Grade `code` and, if every case passes, record the solve.
    ///
    /// Returns `Ok(None)` for an unknown or still-locked challenge without
    /// calling the grader.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeRunError::EmptyCode` for blank submissions and
    /// `ChallengeRunError::Grading` when the grader fails. Progress is left
    /// unchanged in both cases.
    pub async fn run(
        &self,
        challenge_id: &ChallengeId,
        code: &str,
        time_taken_secs: f64,
    ) -> Result<Option<ChallengeRun>, ChallengeRunError> {
        if code.trim().is_empty() {
            return Err(ChallengeRunError::EmptyCode);
        }
        let Some(challenge) = self.progress.catalog().challenge(challenge_id).cloned() else {
            tracing::debug!(challenge = %challenge_id, "run requested for unknown challenge");
            return Ok(None);
        };
        if !self.progress.is_challenge_unlocked(challenge_id).await {
            tracing::debug!(challenge = %challenge_id, "run requested for locked challenge");
            return Ok(None);
        }

        let report = self.grader.grade(&challenge, code).await.inspect_err(|err| {
            tracing::warn!(challenge = %challenge_id, error = %err, "grading failed");
        })?;

        let accepted = report.all_passed()
            && self
                .progress
                .submit_challenge(challenge_id, code, time_taken_secs)
                .await;
        let next_challenge = if accepted {
            self.progress
                .next_challenge(challenge_id)
                .await
                .map(|next| next.id().clone())
        } else {
            None
        };

        tracing::info!(
            challenge = %challenge_id,
            passed = report.passed_count(),
            total = report.cases.len(),
            accepted,
            "challenge graded"
        );

        Ok(Some(ChallengeRun {
            report,
            accepted,
            next_challenge,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(passed: bool) -> CaseVerdict {
        CaseVerdict {
            input: String::new(),
            expected_output: "ok".into(),
            actual_output: Some(if passed { "ok" } else { "nope" }.into()),
            passed,
        }
    }

    #[test]
    fn report_requires_every_case() {
        assert!(GradingReport::new(vec![verdict(true), verdict(true)]).all_passed());
        let mixed = GradingReport::new(vec![verdict(true), verdict(false)]);
        assert!(!mixed.all_passed());
        assert_eq!(mixed.passed_count(), 1);
    }

    #[test]
    fn empty_report_is_not_a_pass() {
        assert!(!GradingReport::default().all_passed());
    }
}
