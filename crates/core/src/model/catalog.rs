use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::challenge::CodingChallenge;
use crate::model::ids::{ChallengeId, LessonId, SectionId};
use crate::model::lesson::Lesson;
use crate::model::section::Section;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate section id: {0}")]
    DuplicateSection(SectionId),

    #[error("duplicate lesson id: {0}")]
    DuplicateLesson(LessonId),

    #[error("duplicate challenge id: {0}")]
    DuplicateChallenge(ChallengeId),

    #[error("lesson {lesson} references unknown section {section}")]
    UnknownSection { lesson: LessonId, section: SectionId },

    #[error("section {section} has two lessons with order {order}")]
    DuplicateLessonOrder { section: SectionId, order: u32 },

    #[error("challenge orders must run 1..=n without gaps: expected {expected}, found {found}")]
    ChallengeOrderGap { expected: u32, found: u32 },
}

/// Static course content: sections, lessons and coding challenges.
///
/// Validated once at load and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    sections: Vec<Section>,
    lessons: Vec<Lesson>,
    challenges: Vec<CodingChallenge>,
    lesson_index: HashMap<LessonId, usize>,
    challenge_index: HashMap<ChallengeId, usize>,
}

impl Catalog {
    /// Build a catalog, checking referential integrity.
    ///
    /// Sections and challenges are kept sorted by `order`; lessons keep their
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for duplicate ids, lessons pointing at a missing
    /// section, clashing lesson orders inside a section, or challenge orders
    /// that are not exactly `1..=n`.
    pub fn new(
        mut sections: Vec<Section>,
        lessons: Vec<Lesson>,
        mut challenges: Vec<CodingChallenge>,
    ) -> Result<Self, CatalogError> {
        let mut section_ids = HashSet::new();
        for section in &sections {
            if !section_ids.insert(section.id().clone()) {
                return Err(CatalogError::DuplicateSection(section.id().clone()));
            }
        }
        sections.sort_by_key(Section::order);

        let mut lesson_index = HashMap::with_capacity(lessons.len());
        let mut orders = HashSet::new();
        for (pos, lesson) in lessons.iter().enumerate() {
            if lesson_index.insert(lesson.id().clone(), pos).is_some() {
                return Err(CatalogError::DuplicateLesson(lesson.id().clone()));
            }
            if !section_ids.contains(lesson.section_id()) {
                return Err(CatalogError::UnknownSection {
                    lesson: lesson.id().clone(),
                    section: lesson.section_id().clone(),
                });
            }
            if !orders.insert((lesson.section_id().clone(), lesson.order())) {
                return Err(CatalogError::DuplicateLessonOrder {
                    section: lesson.section_id().clone(),
                    order: lesson.order(),
                });
            }
        }

        challenges.sort_by_key(CodingChallenge::order);
        let mut challenge_index = HashMap::with_capacity(challenges.len());
        for (pos, challenge) in challenges.iter().enumerate() {
            if challenge_index.insert(challenge.id().clone(), pos).is_some() {
                return Err(CatalogError::DuplicateChallenge(challenge.id().clone()));
            }
            let expected = u32::try_from(pos + 1).unwrap_or(u32::MAX);
            if challenge.order() != expected {
                return Err(CatalogError::ChallengeOrderGap {
                    expected,
                    found: challenge.order(),
                });
            }
        }

        Ok(Self {
            sections,
            lessons,
            challenges,
            lesson_index,
            challenge_index,
        })
    }

    /// Sections sorted by display order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lesson_index.get(id).map(|&pos| &self.lessons[pos])
    }

    /// Lessons of one section, sorted by their in-section order.
    #[must_use]
    pub fn lessons_in_section(&self, section: &SectionId) -> Vec<&Lesson> {
        let mut found: Vec<&Lesson> = self
            .lessons
            .iter()
            .filter(|l| l.section_id() == section)
            .collect();
        found.sort_by_key(|l| l.order());
        found
    }

    /// Every lesson, ordered by section order and then lesson order.
    #[must_use]
    pub fn lessons_in_order(&self) -> Vec<&Lesson> {
        self.sections
            .iter()
            .flat_map(|section| self.lessons_in_section(section.id()))
            .collect()
    }

    /// The lesson immediately before `id` within its section, if any.
    #[must_use]
    pub fn previous_lesson(&self, id: &LessonId) -> Option<&Lesson> {
        let lesson = self.lesson(id)?;
        self.lessons
            .iter()
            .filter(|l| l.section_id() == lesson.section_id() && l.order() < lesson.order())
            .max_by_key(|l| l.order())
    }

    /// Challenges sorted by their global order.
    #[must_use]
    pub fn challenges(&self) -> &[CodingChallenge] {
        &self.challenges
    }

    #[must_use]
    pub fn challenge(&self, id: &ChallengeId) -> Option<&CodingChallenge> {
        self.challenge_index.get(id).map(|&pos| &self.challenges[pos])
    }

    #[must_use]
    pub fn challenge_by_order(&self, order: u32) -> Option<&CodingChallenge> {
        let pos = usize::try_from(order.checked_sub(1)?).ok()?;
        self.challenges.get(pos)
    }
}
