use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memrise_client::MemriseClient;
use memrise_model::{Error, VoiceConfig};
use memrise_pipeline::{ExistingAudio, LevelSelection, Pipeline, RunOptions, RunSummary, Synthesizer, WordStatus};
use memrise_speech::SpeechClient;

mod config;
mod prompt;

use config::{Settings, SettingsArgs};

#[derive(Parser)]
#[command(name = "memrise-audio")]
#[command(about = "Generate text-to-speech audio for Memrise course words and upload it")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize and upload audio for the words of a course
    Upload {
        /// Course id; prompts with your editable courses when unset
        #[arg(short, long)]
        course: Option<u64>,

        /// Level id to process (repeatable); prompts when unset
        #[arg(short, long = "level", conflicts_with = "all_levels")]
        levels: Vec<u64>,

        /// Process every level of the course
        #[arg(long)]
        all_levels: bool,

        /// What to do with words that already have audio; prompts when unset
        #[arg(short, long, value_enum)]
        existing: Option<ExistingArg>,
    },

    /// List the courses you can edit
    Courses {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List Text-to-Speech voices for a language code
    Voices {
        /// Language code (e.g., "ko-KR"); falls back to --language-code
        language: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ExistingArg {
    /// Delete existing audio and upload the new clip
    Replace,
    /// Keep words that already have audio as they are
    Skip,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads environment defaults
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,hyper_util=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,hyper_util=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    let mut settings = Settings::from_args(cli.settings)?;

    match cli.command {
        Commands::Upload {
            course,
            levels,
            all_levels,
            existing,
        } => {
            let levels = if all_levels {
                Some(LevelSelection::All)
            } else if !levels.is_empty() {
                Some(LevelSelection::Only(levels))
            } else {
                None
            };
            let existing = existing.map(|e| match e {
                ExistingArg::Replace => ExistingAudio::Replace,
                ExistingArg::Skip => ExistingAudio::Skip,
            });
            upload(&mut settings, course, levels, existing).await?;
        }
        Commands::Courses { json } => {
            let (username, password) = prompt::credentials(&mut settings)?;
            let mut client = MemriseClient::new(settings.timeout)?;
            client.login(&username, &password).await.map_err(login_error)?;
            let courses = client.courses().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&courses)?);
            } else {
                for course in &courses {
                    println!("{:>10}  {}", course.id, course.name);
                }
            }
        }
        Commands::Voices { language, json } => {
            let language = language
                .or_else(|| settings.language_code.clone())
                .context("a language code is required (argument or --language-code)")?;
            let speech = SpeechClient::new(settings.take_tts_credentials()?, settings.timeout)?;
            let voices = speech.list_voices(&language).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&voices)?);
            } else {
                for voice in &voices {
                    println!("{}  {} ({})", voice.language_code, voice.name, voice.gender);
                }
            }
            tracing::info!(language = %language, voices = voices.len(), "Listed voices");
        }
    }

    Ok(())
}

async fn upload(
    settings: &mut Settings,
    course_id: Option<u64>,
    levels: Option<LevelSelection>,
    existing: Option<ExistingAudio>,
) -> Result<()> {
    let (username, password) = prompt::credentials(settings)?;
    let platform = MemriseClient::new(settings.timeout)?;
    let speech = SpeechClient::new(settings.take_tts_credentials()?, settings.timeout)?;
    let mut pipeline = Pipeline::new(platform, speech);

    pipeline.login(&username, &password).await.map_err(login_error)?;

    let course_id = match course_id {
        Some(id) => id,
        None => {
            let courses = pipeline.platform().courses().await?;
            anyhow::ensure!(
                !courses.is_empty(),
                "Could not find any courses with edit permissions"
            );
            let selected = prompt::select_course(&courses)?;
            tracing::info!(course = %selected.name, "Selected course");
            selected.id
        }
    };

    // Language and interactive level choice both need the course's metadata.
    let needs_course = levels.is_none() || settings.language_code.is_none();
    let course = if needs_course {
        Some(pipeline.platform().course(course_id).await?)
    } else {
        None
    };

    let levels = match levels {
        Some(levels) => levels,
        None => {
            let course = course.as_ref().context("course metadata not loaded")?;
            anyhow::ensure!(!course.levels.is_empty(), "Course does not have any levels");
            prompt::select_levels(course)?
        }
    };

    let language = settings
        .language_code
        .clone()
        .or_else(|| course.as_ref().and_then(|c| c.target_language.clone()))
        .context("course has no target language; pass --language-code")?;
    let voice = choose_voice(settings, pipeline.synthesizer(), language).await?;
    tracing::info!(language = %voice.language_code, voice = ?voice.name, rate = voice.speaking_rate, "Selected voice");

    let existing_audio = match existing {
        Some(existing) => existing,
        None => prompt::existing_audio()?,
    };

    let mut scraped = pipeline.scrape(course_id, &levels).await?;
    tracing::info!(
        course = %scraped.course.name,
        levels = scraped.course.levels.len(),
        words = scraped.course.word_count(),
        "Scraped course"
    );

    let options = RunOptions { voice, existing_audio };
    let summary = pipeline.process(&mut scraped, &options).await;
    report(&summary);

    anyhow::ensure!(
        summary.is_success(),
        "{} word(s) and {} level(s) failed",
        summary.failed(),
        summary.failed_levels.len()
    );
    Ok(())
}

/// Configured voice name, or one picked from the voices offered for `language`.
async fn choose_voice<S: Synthesizer>(
    settings: &Settings,
    synthesizer: &S,
    mut language: String,
) -> Result<VoiceConfig> {
    let mut config = VoiceConfig::new(language.clone());
    config.speaking_rate = settings.speaking_rate;
    config.encoding = settings.encoding;

    if let Some(name) = &settings.voice_name {
        config.name = Some(name.clone());
        return Ok(config);
    }

    loop {
        let voices = synthesizer.list_voices(&language).await?;
        if voices.is_empty() {
            language = prompt::language_code(&language)?;
            continue;
        }
        let voice = prompt::select_voice(&voices)?;
        return Ok(config.with_voice(voice));
    }
}

fn login_error(err: Error) -> anyhow::Error {
    match err {
        Error::Authentication(_) => anyhow::anyhow!("Invalid username or password ({err})"),
        other => other.into(),
    }
}

fn report(summary: &RunSummary) {
    for failure in &summary.failed_levels {
        tracing::error!(level_id = failure.level_id, title = %failure.title, error = %failure.error, "Level failed");
    }
    for outcome in &summary.outcomes {
        if let WordStatus::Failed(e) = &outcome.status {
            tracing::error!(level_id = outcome.level_id, thing_id = outcome.thing_id, kind = e.kind(), "Word '{}' failed: {e}", outcome.text);
        }
    }
    tracing::info!(
        course = %summary.course,
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        skipped = summary.skipped(),
        failed_levels = summary.failed_levels.len(),
        seconds = format!("{:.1}", summary.elapsed_seconds()),
        "Summary"
    );
}
