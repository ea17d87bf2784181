use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaking rate used when none is configured.
pub const DEFAULT_SPEAKING_RATE: f32 = 0.75;

/// Range the speech API accepts for `speakingRate`.
pub const SPEAKING_RATE_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;

/// Audio container/codec requested from the speech API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    /// 16-bit PCM in a WAV container.
    Linear16,
    OggOpus,
}

impl AudioEncoding {
    /// Name used in the speech API's `audioConfig.audioEncoding`.
    pub fn api_name(self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::OggOpus => "OGG_OPUS",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::Linear16 => "wav",
            AudioEncoding::OggOpus => "ogg",
        }
    }

    /// MIME type sent with the uploaded file part.
    pub fn mime_type(self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "audio/mp3",
            AudioEncoding::Linear16 => "audio/wav",
            AudioEncoding::OggOpus => "audio/ogg",
        }
    }
}

/// Synthesized audio, held in memory between synthesis and upload.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub encoding: AudioEncoding,
}

impl AudioClip {
    pub fn new(data: Vec<u8>, encoding: AudioEncoding) -> Self {
        Self { data, encoding }
    }

    /// File name the platform stores the clip under.
    pub fn file_name(&self) -> String {
        format!("audio.{}", self.encoding.extension())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Audio payloads are large; print their size instead of the bytes.
impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("bytes", &self.data.len())
            .field("encoding", &self.encoding)
            .finish()
    }
}

/// SSML voice gender as reported by the speech API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    SsmlVoiceGenderUnspecified,
    Male,
    Female,
    Neutral,
}

impl fmt::Display for SsmlGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SsmlGender::SsmlVoiceGenderUnspecified => "unspecified",
            SsmlGender::Male => "male",
            SsmlGender::Female => "female",
            SsmlGender::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// A voice offered by the speech API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voice {
    pub language_code: String,
    pub name: String,
    pub gender: SsmlGender,
}

/// How every word of a run is voiced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceConfig {
    /// BCP-47 language code (e.g., "ko-KR").
    pub language_code: String,
    /// Specific voice name; the API picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<SsmlGender>,
    pub speaking_rate: f32,
    pub encoding: AudioEncoding,
}

impl VoiceConfig {
    pub fn new(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            name: None,
            gender: None,
            speaking_rate: DEFAULT_SPEAKING_RATE,
            encoding: AudioEncoding::default(),
        }
    }

    /// Use a listed voice, keeping rate and encoding.
    pub fn with_voice(mut self, voice: &Voice) -> Self {
        self.language_code = voice.language_code.clone();
        self.name = Some(voice.name.clone());
        self.gender = Some(voice.gender);
        self
    }
}
