use chrono::{DateTime, Utc};

use crate::model::{Lesson, LessonId, LessonProgress, SectionId};
use crate::time::days_apart;

use super::ProgressStore;

/// Completions within this many days of each other keep a streak alive.
const STREAK_WINDOW_DAYS: f64 = 7.0;

/// How many completions `recently_completed` lists.
const RECENT_LIMIT: usize = 5;

/// Completed-out-of-total counter for a section or the whole course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressCount {
    pub completed: usize,
    pub total: usize,
}

impl ProgressCount {
    /// Rounded completion percentage; an empty scope is 0%.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let completed = self.completed.min(self.total);
        let pct = (200 * completed + self.total) / (2 * self.total);
        u8::try_from(pct).unwrap_or(100)
    }
}

/// Learner statistics shown on the progress screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressStats {
    /// Mean relative improvement from pre- to post-test, in percent.
    pub average_improvement: i32,
    /// Sum of estimated minutes over completed lessons.
    pub total_study_minutes: u32,
    /// Completions chained together with gaps of at most a week.
    pub streak: u32,
    /// Up to five completed lessons, most recent first.
    pub recently_completed: Vec<LessonId>,
}

impl ProgressStore {
    fn count_completed<'a>(&self, lessons: impl Iterator<Item = &'a Lesson>) -> ProgressCount {
        let mut count = ProgressCount::default();
        for lesson in lessons {
            count.total += 1;
            if self
                .state
                .lesson_progress
                .get(lesson.id())
                .is_some_and(LessonProgress::is_completed)
            {
                count.completed += 1;
            }
        }
        count
    }

    #[must_use]
    pub fn section_progress(&self, section_id: &SectionId) -> ProgressCount {
        self.count_completed(
            self.catalog
                .lessons()
                .iter()
                .filter(|l| l.section_id() == section_id),
        )
    }

    #[must_use]
    pub fn overall_progress(&self) -> ProgressCount {
        self.count_completed(self.catalog.lessons().iter())
    }

    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        let mut completed: Vec<(&LessonProgress, DateTime<Utc>)> = self
            .state
            .lesson_progress
            .values()
            .filter_map(|p| p.completed_at().map(|at| (p, at)))
            .collect();
        completed.sort_by(|a, b| b.1.cmp(&a.1));

        ProgressStats {
            average_improvement: average_improvement(completed.iter().map(|(p, _)| *p)),
            total_study_minutes: completed
                .iter()
                .filter_map(|(p, _)| self.catalog.lesson(p.lesson_id()))
                .map(Lesson::estimated_minutes)
                .sum(),
            streak: streak(completed.iter().map(|(_, at)| *at)),
            recently_completed: completed
                .iter()
                .take(RECENT_LIMIT)
                .map(|(p, _)| p.lesson_id().clone())
                .collect(),
        }
    }
}

/// Mean of `(post - pre) / pre * 100` over lessons with a non-zero pre-score.
fn average_improvement<'a>(completed: impl Iterator<Item = &'a LessonProgress>) -> i32 {
    let ratios: Vec<f64> = completed
        .filter_map(|p| Some((p.pre_test_score()?, p.post_test_score()?)))
        .filter(|(pre, _)| pre.value() > 0)
        .map(|(pre, post)| {
            let pre = f64::from(pre.value());
            (f64::from(post.value()) - pre) / pre * 100.0
        })
        .collect();

    if ratios.is_empty() {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    // Halves round toward positive infinity (-12.5 -> -12).
    // Bounded: pre >= 1 and post <= 100 keep the mean within [-100, 9900].
    #[allow(clippy::cast_possible_truncation)]
    let rounded = (mean + 0.5).floor() as i32;
    rounded
}

/// `newest_first` must be sorted by completion time, descending.
fn streak(newest_first: impl Iterator<Item = DateTime<Utc>>) -> u32 {
    let mut streak = 0;
    let mut previous: Option<DateTime<Utc>> = None;
    for at in newest_first {
        if let Some(prev) = previous {
            if days_apart(prev, at) > STREAK_WINDOW_DAYS {
                break;
            }
        }
        streak += 1;
        previous = Some(at);
    }
    streak
}
