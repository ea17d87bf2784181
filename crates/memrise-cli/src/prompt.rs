use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};
use memrise_model::{Course, CourseSummary, Voice};
use memrise_pipeline::{ExistingAudio, LevelSelection};
use secrecy::SecretString;

use crate::config::Settings;

/// Username and password from settings, asking for whatever is missing.
pub fn credentials(settings: &mut Settings) -> Result<(String, SecretString)> {
    let username = match settings.username.take() {
        Some(name) => {
            tracing::info!(username = %name, "Using configured username");
            name
        }
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };

    let password = match settings.password.take() {
        Some(password) => {
            tracing::info!("Using stored password");
            password
        }
        None => SecretString::from(Password::new().with_prompt("Password").interact()?),
    };

    Ok((username, password))
}

pub fn select_course(courses: &[CourseSummary]) -> Result<&CourseSummary> {
    let names: Vec<&str> = courses.iter().map(|c| c.name.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Select a course")
        .items(&names)
        .default(0)
        .interact()?;
    Ok(&courses[idx])
}

pub fn select_levels(course: &Course) -> Result<LevelSelection> {
    let mut items = vec!["All levels".to_string()];
    items.extend(course.levels.iter().map(ToString::to_string));

    let idx = Select::new()
        .with_prompt("Select a level")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(match idx {
        0 => LevelSelection::All,
        n => LevelSelection::Only(vec![course.levels[n - 1].id]),
    })
}

pub fn select_voice(voices: &[Voice]) -> Result<&Voice> {
    let items: Vec<String> = voices
        .iter()
        .map(|v| format!("{} ({})", v.name, v.gender))
        .collect();
    let idx = Select::new()
        .with_prompt("Select a voice")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(&voices[idx])
}

pub fn language_code(current: &str) -> Result<String> {
    tracing::warn!(language_code = current, "No voices found for language code");
    Ok(Input::<String>::new()
        .with_prompt("Language code")
        .interact_text()?)
}

pub fn existing_audio() -> Result<ExistingAudio> {
    let replace = Confirm::new()
        .with_prompt("Replace existing audio?")
        .default(false)
        .interact()?;
    Ok(if replace { ExistingAudio::Replace } else { ExistingAudio::Skip })
}
