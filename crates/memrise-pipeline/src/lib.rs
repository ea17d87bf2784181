pub mod backend;
pub mod pipeline;
pub mod summary;
pub mod uploader;

pub use backend::{Platform, SynthesisRequest, Synthesizer};
pub use pipeline::{ExistingAudio, LevelSelection, Pipeline, PipelineState, RunOptions, ScrapedCourse};
pub use summary::{LevelFailure, RunSummary, SkipReason, WordOutcome, WordStatus};

#[cfg(test)]
pub(crate) mod fakes;
