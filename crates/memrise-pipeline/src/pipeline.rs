use crate::backend::{Platform, SynthesisRequest, Synthesizer};
use crate::summary::{LevelFailure, RunSummary, SkipReason, WordOutcome, WordStatus};
use crate::uploader;
use memrise_model::{Course, Error, Result, VoiceConfig};
use secrecy::SecretString;
use std::fmt;

/// Where a pipeline is in its run over a course.
///
/// `NotStarted → LoggingIn → LoggedIn → Scraping → (Synthesizing ⇄ Uploading) → Done`,
/// with `Failed` reachable from any step on an unrecoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    LoggingIn,
    LoggedIn,
    Scraping,
    Synthesizing,
    Uploading,
    Done,
    Failed,
}

/// What to do with words that already have audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingAudio {
    /// Delete the old audio and upload the new clip.
    #[default]
    Replace,
    /// Leave the word alone.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LevelSelection {
    #[default]
    All,
    /// Level ids to process, in course order.
    Only(Vec<u64>),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub voice: VoiceConfig,
    pub existing_audio: ExistingAudio,
}

/// A course with the words of every selected level filled in.
#[derive(Debug)]
pub struct ScrapedCourse {
    pub course: Course,
    /// Levels that could not be scraped; they carry no words.
    pub failed_levels: Vec<LevelFailure>,
}

/// Drives login, scraping, synthesis and upload for one course.
///
/// Words are processed strictly one after another so log output and the
/// summary follow course order.
pub struct Pipeline<P, S> {
    platform: P,
    synthesizer: S,
    state: PipelineState,
}

impl<P: Platform, S: Synthesizer> Pipeline<P, S> {
    pub fn new(platform: P, synthesizer: S) -> Self {
        Self {
            platform,
            synthesizer,
            state: PipelineState::NotStarted,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Log in, scrape and process a course in one go.
    pub async fn run(
        &mut self,
        username: &str,
        password: &SecretString,
        course_id: u64,
        levels: &LevelSelection,
        options: &RunOptions,
    ) -> Result<RunSummary> {
        self.login(username, password).await?;
        let mut scraped = self.scrape(course_id, levels).await?;
        Ok(self.process(&mut scraped, options).await)
    }

    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<()> {
        self.state = PipelineState::LoggingIn;
        match self.platform.login(username, password).await {
            Ok(()) => {
                self.state = PipelineState::LoggedIn;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    /// Fetch the course and the words of each selected level.
    ///
    /// A level that fails to scrape is recorded and skipped. Failing to
    /// fetch the course itself, or losing the session, fails the run.
    pub async fn scrape(&mut self, course_id: u64, selection: &LevelSelection) -> Result<ScrapedCourse> {
        match self.state {
            PipelineState::LoggedIn => {}
            PipelineState::NotStarted | PipelineState::LoggingIn => {
                return Err(Error::Authentication(
                    "cannot scrape before logging in".to_string(),
                ))
            }
            state => {
                return Err(Error::Config(format!(
                    "cannot scrape a course while the pipeline is {state}"
                )))
            }
        }
        self.state = PipelineState::Scraping;

        let mut course = match self.platform.course(course_id).await {
            Ok(course) => course,
            Err(e) => {
                tracing::error!(course_id, error = %e, "Failed to fetch course");
                self.state = PipelineState::Failed;
                return Err(e);
            }
        };

        if let LevelSelection::Only(ids) = selection {
            for id in ids {
                if !course.levels.iter().any(|l| l.id == *id) {
                    tracing::warn!(level_id = id, course = %course.name, "Selected level is not part of the course");
                }
            }
            course.levels.retain(|l| ids.contains(&l.id));
        }

        let mut failed_levels = Vec::new();
        for level in &mut course.levels {
            match self.platform.level_words(level.id).await {
                Ok(words) => {
                    tracing::info!(level = %level, words = words.len(), "Scraped level");
                    level.words = words;
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(level = %level, error = %e, "Lost session while scraping");
                    self.state = PipelineState::Failed;
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(level = %level, error = %e, "Failed to scrape level");
                    failed_levels.push(LevelFailure {
                        level_id: level.id,
                        title: level.title.clone(),
                        error: e,
                    });
                }
            }
        }

        Ok(ScrapedCourse { course, failed_levels })
    }

    /// Synthesize and upload audio for every scraped word.
    ///
    /// Per-word failures are recorded in the summary and never stop the
    /// run; every word gets its attempt.
    pub async fn process(&mut self, scraped: &mut ScrapedCourse, options: &RunOptions) -> RunSummary {
        let started_at = chrono::Utc::now();
        let mut outcomes = Vec::with_capacity(scraped.course.word_count());

        for level in &mut scraped.course.levels {
            tracing::info!(level = %level, "Processing level");
            for word in &mut level.words {
                let status = if word.has_audio() && options.existing_audio == ExistingAudio::Skip {
                    tracing::info!(thing_id = word.thing_id, "Word already has audio. Skipping word '{}'", word.target_text);
                    WordStatus::Skipped(SkipReason::HasAudio)
                } else {
                    self.state = PipelineState::Synthesizing;
                    let request = SynthesisRequest::for_word(word, &options.voice);
                    match self.synthesizer.synthesize(&request).await {
                        Err(e) => WordStatus::Failed(e),
                        Ok(clip) => {
                            self.state = PipelineState::Uploading;
                            match uploader::replace_audio(&self.platform, word, &clip).await {
                                Ok(replaced) => WordStatus::Uploaded { replaced },
                                Err(e) => WordStatus::Failed(e),
                            }
                        }
                    }
                };

                if let WordStatus::Failed(e) = &status {
                    tracing::warn!(thing_id = word.thing_id, kind = e.kind(), error = %e, "Failed word '{}'", word.target_text);
                }

                outcomes.push(WordOutcome {
                    level_id: level.id,
                    thing_id: word.thing_id,
                    text: word.target_text.clone(),
                    status,
                });
            }
        }

        self.state = PipelineState::Done;
        let summary = RunSummary {
            course: scraped.course.name.clone(),
            outcomes,
            failed_levels: std::mem::take(&mut scraped.failed_levels),
            started_at,
            finished_at: chrono::Utc::now(),
        };
        tracing::info!(
            course = %summary.course,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            failed_levels = summary.failed_levels.len(),
            "Finished course"
        );
        summary
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::NotStarted => "not started",
            PipelineState::LoggingIn => "logging in",
            PipelineState::LoggedIn => "logged in",
            PipelineState::Scraping => "scraping",
            PipelineState::Synthesizing => "synthesizing",
            PipelineState::Uploading => "uploading",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(s)
    }
}
