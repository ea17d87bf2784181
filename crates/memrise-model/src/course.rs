use serde::{Deserialize, Serialize};
use std::fmt;

/// A course the logged-in user can edit, as listed on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseSummary {
    pub id: u64,
    pub name: String,
}

/// A course with its ordered levels.
///
/// Levels start out without words; the scraper fills them in one level
/// at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub name: String,
    /// Language code of the language being taught (e.g., "ko-KR", "fr").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    pub levels: Vec<Level>,
}

/// A level within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub id: u64,
    /// 1-based position of the level within the course.
    pub index: u32,
    pub title: String,
    pub words: Vec<Word>,
}

/// A vocabulary entry (a "thing" in Memrise terms) from a level's word table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Word {
    /// Platform id of the entry, used to associate uploads with it.
    pub thing_id: u64,
    /// Text in the language being learned. This is what gets synthesized.
    pub target_text: String,
    /// Text in the learner's language, if the table has a definition column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    /// `data-key` of the audio cell; names the column uploads go into.
    pub audio_column: String,
    /// Audio files currently attached to the audio cell.
    pub attachments: Vec<AttachmentId>,
}

/// Id of an audio file inside a word's audio cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AttachmentId(pub String);

impl Course {
    pub fn word_count(&self) -> usize {
        self.levels.iter().map(|l| l.words.len()).sum()
    }
}

impl Word {
    pub fn has_audio(&self) -> bool {
        !self.attachments.is_empty()
    }
}

impl From<&str> for AttachmentId {
    fn from(s: &str) -> Self {
        AttachmentId(s.to_string())
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index, self.title)
    }
}
