use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ids::ChallengeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChallengeError {
    #[error("challenge {0} has an empty title")]
    EmptyTitle(ChallengeId),

    #[error("challenge {0} must have an order of at least 1")]
    ZeroOrder(ChallengeId),

    #[error("challenge {0} has no test cases")]
    NoTestCases(ChallengeId),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ChallengeError::UnknownDifficulty(s.to_owned())),
        }
    }
}

/// One input/expected-output pair a submission is graded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    pub description: Option<String>,
}

impl TestCase {
    #[must_use]
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Unvalidated challenge fields, as written in the course data.
#[derive(Debug, Clone)]
pub struct ChallengeDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub order: u32,
    pub points: u32,
    pub time_limit_minutes: u32,
    pub memory_limit: String,
    pub starter_code: String,
    pub solution: String,
    pub test_cases: Vec<TestCase>,
    pub hints: Vec<String>,
    pub explanation: String,
    pub concepts: Vec<String>,
}

impl ChallengeDraft {
    /// # Errors
    ///
    /// Returns `ChallengeError` for a blank title, an order of zero or an empty
    /// test-case list.
    pub fn validate(self) -> Result<CodingChallenge, ChallengeError> {
        let id = ChallengeId::new(self.id);
        if self.title.trim().is_empty() {
            return Err(ChallengeError::EmptyTitle(id));
        }
        if self.order == 0 {
            return Err(ChallengeError::ZeroOrder(id));
        }
        if self.test_cases.is_empty() {
            return Err(ChallengeError::NoTestCases(id));
        }

        Ok(CodingChallenge {
            id,
            title: self.title.trim().to_owned(),
            description: self.description,
            difficulty: self.difficulty,
            category: self.category,
            order: self.order,
            points: self.points,
            time_limit_minutes: self.time_limit_minutes,
            memory_limit: self.memory_limit,
            starter_code: self.starter_code,
            solution: self.solution,
            test_cases: self.test_cases,
            hints: self.hints,
            explanation: self.explanation,
            concepts: self.concepts,
        })
    }
}

/// A practice exercise in the challenge catalog.
///
/// `order` is global across categories and drives unlock sequencing.
/// `time_limit_minutes` is advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodingChallenge {
    id: ChallengeId,
    title: String,
    description: String,
    difficulty: Difficulty,
    category: String,
    order: u32,
    points: u32,
    time_limit_minutes: u32,
    memory_limit: String,
    starter_code: String,
    solution: String,
    test_cases: Vec<TestCase>,
    hints: Vec<String>,
    explanation: String,
    concepts: Vec<String>,
}

impl CodingChallenge {
    #[must_use]
    pub fn id(&self) -> &ChallengeId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn memory_limit(&self) -> &str {
        &self.memory_limit
    }

    #[must_use]
    pub fn starter_code(&self) -> &str {
        &self.starter_code
    }

    #[must_use]
    pub fn solution(&self) -> &str {
        &self.solution
    }

    #[must_use]
    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    #[must_use]
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }
}
