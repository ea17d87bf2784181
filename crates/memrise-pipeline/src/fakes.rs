//! In-memory platform and synthesizer that record every call in order.

use crate::backend::{Platform, SynthesisRequest, Synthesizer};
use async_trait::async_trait;
use memrise_model::{
    AttachmentId, AudioClip, Course, CourseSummary, Error, Level, Result, SsmlGender,
    Voice, Word,
};
use secrecy::SecretString;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn word(thing_id: u64, text: &str, attachments: &[&str]) -> Word {
    Word {
        thing_id,
        target_text: text.to_string(),
        source_text: None,
        audio_column: "3".to_string(),
        attachments: attachments.iter().map(|a| AttachmentId::from(*a)).collect(),
    }
}

#[derive(Default)]
pub struct FakePlatform {
    pub log: CallLog,
    pub reject_login: bool,
    pub course: Option<Course>,
    pub words: HashMap<u64, Vec<Word>>,
    pub broken_levels: HashSet<u64>,
    pub failing_uploads: HashSet<u64>,
    pub failing_deletes: HashSet<u64>,
}

impl FakePlatform {
    /// A course whose levels hold the given words, keyed by level id.
    pub fn with_levels(log: &CallLog, levels: Vec<(u64, Vec<Word>)>) -> Self {
        let course = Course {
            id: 1,
            name: "French".to_string(),
            target_language: Some("fr".to_string()),
            levels: levels
                .iter()
                .enumerate()
                .map(|(i, (id, _))| Level {
                    id: *id,
                    index: i as u32 + 1,
                    title: format!("Level {}", i + 1),
                    words: Vec::new(),
                })
                .collect(),
        };
        Self {
            log: Arc::clone(log),
            course: Some(course),
            words: levels.into_iter().collect(),
            ..Self::default()
        }
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn login(&mut self, username: &str, _password: &SecretString) -> Result<()> {
        self.record(format!("login {username}"));
        if self.reject_login {
            return Err(Error::Authentication("HTTP 403".to_string()));
        }
        Ok(())
    }

    async fn courses(&self) -> Result<Vec<CourseSummary>> {
        self.record("courses".to_string());
        Ok(self
            .course
            .iter()
            .map(|c| CourseSummary { id: c.id, name: c.name.clone() })
            .collect())
    }

    async fn course(&self, course_id: u64) -> Result<Course> {
        self.record(format!("course {course_id}"));
        self.course
            .clone()
            .filter(|c| c.id == course_id)
            .ok_or_else(|| Error::Parse(format!("course {course_id} missing from response")))
    }

    async fn level_words(&self, level_id: u64) -> Result<Vec<Word>> {
        self.record(format!("level {level_id}"));
        if self.broken_levels.contains(&level_id) {
            return Err(Error::Parse("level editing HTML has no word table".to_string()));
        }
        Ok(self.words.get(&level_id).cloned().unwrap_or_default())
    }

    async fn delete_audio(&self, word: &Word, attachment: &AttachmentId) -> Result<()> {
        self.record(format!("delete {} {attachment}", word.thing_id));
        if self.failing_deletes.contains(&word.thing_id) {
            return Err(Error::Upload("HTTP 500".to_string()));
        }
        Ok(())
    }

    async fn upload_audio(&self, word: &Word, clip: &AudioClip) -> Result<()> {
        self.record(format!("upload {} {}", word.thing_id, clip.file_name()));
        if self.failing_uploads.contains(&word.thing_id) {
            return Err(Error::Upload("HTTP 500".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSynthesizer {
    pub log: CallLog,
    pub failing_texts: HashSet<String>,
    pub requests: Mutex<Vec<SynthesisRequest>>,
}

impl FakeSynthesizer {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Arc::clone(log),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip> {
        self.log.lock().unwrap().push(format!("synthesize {}", request.text));
        self.requests.lock().unwrap().push(request.clone());
        if self.failing_texts.contains(&request.text) {
            return Err(Error::Synthesis("quota exceeded".to_string()));
        }
        Ok(AudioClip::new(request.text.as_bytes().to_vec(), request.voice.encoding))
    }

    async fn list_voices(&self, language_code: &str) -> Result<Vec<Voice>> {
        Ok(vec![Voice {
            language_code: language_code.to_string(),
            name: format!("{language_code}-Standard-A"),
            gender: SsmlGender::Female,
        }])
    }
}
