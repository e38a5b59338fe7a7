//! The built-in C++ course, embedded at compile time.

use serde::Deserialize;
use thiserror::Error;

use course_core::model::{
    Catalog, ChallengeDraft, Difficulty, LessonDraft, Question, QuestionId, Section, SectionId,
    TestCase,
};

const COURSE_JSON: &str = include_str!("../data/course.json");

#[derive(Debug, Error)]
pub enum CourseDataError {
    #[error("course data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("course data is invalid: {0}")]
    Invalid(#[from] course_core::Error),
}

#[derive(Debug, Deserialize)]
struct CourseFile {
    sections: Vec<SectionRow>,
    lessons: Vec<LessonRow>,
    challenges: Vec<ChallengeRow>,
}

#[derive(Debug, Deserialize)]
struct SectionRow {
    id: String,
    title: String,
    description: String,
    color: String,
    order: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRow {
    id: String,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonRow {
    id: String,
    title: String,
    description: String,
    content: String,
    #[serde(default)]
    video_url: Option<String>,
    estimated_time: u32,
    order: u32,
    section_id: String,
    pre_test: Vec<QuestionRow>,
    post_test: Vec<QuestionRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestCaseRow {
    input: String,
    expected_output: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRow {
    id: String,
    title: String,
    description: String,
    difficulty: String,
    category: String,
    order: u32,
    points: u32,
    time_limit: u32,
    memory_limit: String,
    starter_code: String,
    solution: String,
    test_cases: Vec<TestCaseRow>,
    #[serde(default)]
    hints: Vec<String>,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    concepts: Vec<String>,
}

fn questions(rows: Vec<QuestionRow>) -> Result<Vec<Question>, course_core::Error> {
    rows.into_iter()
        .map(|row| {
            Question::new(
                QuestionId::new(row.id),
                row.question,
                row.options,
                row.correct_answer,
                row.explanation,
            )
            .map_err(Into::into)
        })
        .collect()
}

fn test_case(row: TestCaseRow) -> TestCase {
    let case = TestCase::new(row.input, row.expected_output);
    match row.description {
        Some(description) => case.described(description),
        None => case,
    }
}

/// Parse and validate a course file.
///
/// # Errors
///
/// Returns `CourseDataError` for malformed JSON or course data that fails
/// validation.
pub fn parse_course(raw: &str) -> Result<Catalog, CourseDataError> {
    let file: CourseFile = serde_json::from_str(raw)?;

    let sections = file
        .sections
        .into_iter()
        .map(|s| Section::new(SectionId::new(s.id), s.title, s.description, s.color, s.order))
        .collect();

    let mut lessons = Vec::with_capacity(file.lessons.len());
    for row in file.lessons {
        let draft = LessonDraft {
            id: row.id,
            title: row.title,
            description: row.description,
            content: row.content,
            video_url: row.video_url,
            estimated_minutes: row.estimated_time,
            order: row.order,
            section_id: row.section_id,
            pre_test: questions(row.pre_test)?,
            post_test: questions(row.post_test)?,
        };
        lessons.push(draft.validate().map_err(course_core::Error::from)?);
    }

    let mut challenges = Vec::with_capacity(file.challenges.len());
    for row in file.challenges {
        let difficulty: Difficulty = row.difficulty.parse().map_err(course_core::Error::from)?;
        let draft = ChallengeDraft {
            id: row.id,
            title: row.title,
            description: row.description,
            difficulty,
            category: row.category,
            order: row.order,
            points: row.points,
            time_limit_minutes: row.time_limit,
            memory_limit: row.memory_limit,
            starter_code: row.starter_code,
            solution: row.solution,
            test_cases: row.test_cases.into_iter().map(test_case).collect(),
            hints: row.hints,
            explanation: row.explanation,
            concepts: row.concepts,
        };
        challenges.push(draft.validate().map_err(course_core::Error::from)?);
    }

    let catalog =
        Catalog::new(sections, lessons, challenges).map_err(course_core::Error::from)?;
    Ok(catalog)
}

/// The course shipped with the app.
///
/// # Errors
///
/// Returns `CourseDataError` if the embedded data is broken.
pub fn builtin_course() -> Result<Catalog, CourseDataError> {
    parse_course(COURSE_JSON)
}
