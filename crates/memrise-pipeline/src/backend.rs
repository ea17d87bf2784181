//! Seams between the pipeline and the two remote services.

use async_trait::async_trait;
use memrise_client::MemriseClient;
use memrise_model::{AttachmentId, AudioClip, Course, CourseSummary, Result, Voice, VoiceConfig, Word};
use memrise_speech::SpeechClient;
use secrecy::SecretString;

/// The vocabulary platform: session, scraping and attachment calls.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn login(&mut self, username: &str, password: &SecretString) -> Result<()>;

    /// Courses the user may edit.
    async fn courses(&self) -> Result<Vec<CourseSummary>>;

    /// Course metadata and its levels, without words.
    async fn course(&self, course_id: u64) -> Result<Course>;

    async fn level_words(&self, level_id: u64) -> Result<Vec<Word>>;

    async fn delete_audio(&self, word: &Word, attachment: &AttachmentId) -> Result<()>;

    async fn upload_audio(&self, word: &Word, clip: &AudioClip) -> Result<()>;
}

/// The speech synthesis service.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip>;

    async fn list_voices(&self, language_code: &str) -> Result<Vec<Voice>>;
}

/// What gets sent to the synthesizer for one word.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceConfig,
}

impl SynthesisRequest {
    /// Voice the word's target-language text.
    pub fn for_word(word: &Word, voice: &VoiceConfig) -> Self {
        Self {
            text: word.target_text.clone(),
            voice: voice.clone(),
        }
    }
}

#[async_trait]
impl Platform for MemriseClient {
    async fn login(&mut self, username: &str, password: &SecretString) -> Result<()> {
        MemriseClient::login(self, username, password).await
    }

    async fn courses(&self) -> Result<Vec<CourseSummary>> {
        MemriseClient::courses(self).await
    }

    async fn course(&self, course_id: u64) -> Result<Course> {
        MemriseClient::course(self, course_id).await
    }

    async fn level_words(&self, level_id: u64) -> Result<Vec<Word>> {
        MemriseClient::level_words(self, level_id).await
    }

    async fn delete_audio(&self, word: &Word, attachment: &AttachmentId) -> Result<()> {
        MemriseClient::delete_audio(self, word, attachment).await
    }

    async fn upload_audio(&self, word: &Word, clip: &AudioClip) -> Result<()> {
        MemriseClient::upload_audio(self, word, clip).await
    }
}

#[async_trait]
impl Synthesizer for SpeechClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip> {
        SpeechClient::synthesize(self, &request.text, &request.voice).await
    }

    async fn list_voices(&self, language_code: &str) -> Result<Vec<Voice>> {
        SpeechClient::list_voices(self, language_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_target_text_and_language() {
        let html = r#"
        <table><tr class="thing" data-thing-id="1001">
          <td></td>
          <td class="cell text column" data-key="1"><div><div>bonjour</div></div></td>
          <td class="cell text column" data-key="2"><div><div>hello</div></div></td>
          <td class="cell audio column" data-key="3"><div><div class="dropdown-menu"></div></div></td>
        </tr></table>
        "#;
        let words = memrise_parse::parse_level_words(html).unwrap();
        assert_eq!(words[0].source_text.as_deref(), Some("hello"));

        let voice = VoiceConfig::new("fr-FR");
        let request = SynthesisRequest::for_word(&words[0], &voice);
        assert_eq!(request.text, "bonjour");
        assert_eq!(request.voice.language_code, "fr-FR");
    }
}
