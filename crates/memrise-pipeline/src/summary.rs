use chrono::{DateTime, Utc};
use memrise_model::Error;

/// Result of one run over a course.
#[derive(Debug)]
pub struct RunSummary {
    pub course: String,
    /// One entry per word, in processing order.
    pub outcomes: Vec<WordOutcome>,
    pub failed_levels: Vec<LevelFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WordOutcome {
    pub level_id: u64,
    pub thing_id: u64,
    pub text: String,
    pub status: WordStatus,
}

#[derive(Debug)]
pub enum WordStatus {
    /// New audio is on the platform; `replaced` old files were removed first.
    Uploaded { replaced: usize },
    Skipped(SkipReason),
    Failed(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The word already has audio and the run keeps existing audio.
    HasAudio,
}

/// A level whose words could not be scraped.
#[derive(Debug)]
pub struct LevelFailure {
    pub level_id: u64,
    pub title: String,
    pub error: Error,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, WordStatus::Uploaded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, WordStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, WordStatus::Skipped(_)))
    }

    /// True when no word and no level failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.failed_levels.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&WordOutcome, &Error)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            WordStatus::Failed(e) => Some((o, e)),
            _ => None,
        })
    }

    pub fn elapsed_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    fn count(&self, pred: impl Fn(&WordStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
