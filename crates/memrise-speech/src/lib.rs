//! Google Cloud Text-to-Speech client

use base64::Engine;
use memrise_model::{AudioClip, Error, Result, SsmlGender, Voice, VoiceConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const BASE_URL: &str = "https://texttospeech.googleapis.com";

/// How requests to the speech API are authorized
pub enum Credentials {
    /// API key, sent as the `key` query parameter
    ApiKey(SecretString),
    /// OAuth access token (e.g., from `gcloud auth print-access-token`)
    AccessToken(SecretString),
}

/// Synthesizes speech through the REST API
pub struct SpeechClient {
    client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
}

impl SpeechClient {
    /// Create a client against the public endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        Self::with_base_url(credentials, BASE_URL, timeout)
    }

    /// Create a client against a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_base_url(credentials: Credentials, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Decoded audio in the configured encoding
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] on API errors (quota, invalid language,
    /// timeouts, network failures) or an undecodable response
    pub async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<AudioClip> {
        let request = SynthesizeRequest::new(text, voice);
        let url = format!("{}/v1/text:synthesize", self.base_url);

        let response = self
            .authorize(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(describe(&e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("TTS API error {status}: {}", api_message(&body))));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(format!("invalid TTS response: {e}")))?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(body.audio_content.as_bytes())
            .map_err(|e| Error::Synthesis(format!("invalid audio content: {e}")))?;

        if data.is_empty() {
            return Err(Error::Synthesis(format!("empty audio returned for '{text}'")));
        }

        tracing::debug!(bytes = data.len(), lang = %voice.language_code, "Synthesized audio");
        Ok(AudioClip::new(data, voice.encoding))
    }

    /// List voices available for a language code
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] if the API call fails
    pub async fn list_voices(&self, language_code: &str) -> Result<Vec<Voice>> {
        let url = format!("{}/v1/voices", self.base_url);

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("languageCode", language_code)])
            .send()
            .await
            .map_err(|e| Error::Synthesis(describe(&e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("TTS API error {status}: {}", api_message(&body))));
        }

        let body: VoicesResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(format!("invalid voice listing: {e}")))?;

        let mut voices: Vec<Voice> = body
            .voices
            .into_iter()
            .filter_map(|v| v.into_voice(language_code))
            .collect();
        voices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(voices)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Credentials::ApiKey(key) => builder.query(&[("key", key.expose_secret())]),
            Credentials::AccessToken(token) => builder.bearer_auth(token.expose_secret()),
        }
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "TTS request timed out".to_string()
    } else {
        format!("TTS request failed: {err}")
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the raw body
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssml_gender: Option<SsmlGender>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
}

impl<'a> SynthesizeRequest<'a> {
    fn new(text: &'a str, voice: &'a VoiceConfig) -> Self {
        Self {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &voice.language_code,
                name: voice.name.as_deref(),
                ssml_gender: voice.gender,
            },
            audio_config: AudioConfig {
                audio_encoding: voice.encoding.api_name(),
                speaking_rate: voice.speaking_rate,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceEntry {
    #[serde(default)]
    language_codes: Vec<String>,
    name: String,
    ssml_gender: Option<SsmlGender>,
}

impl VoiceEntry {
    /// Voices can serve several languages; prefer the one asked for.
    fn into_voice(self, requested: &str) -> Option<Voice> {
        let language_code = self
            .language_codes
            .iter()
            .find(|c| c.eq_ignore_ascii_case(requested))
            .or_else(|| self.language_codes.first())?
            .clone();
        Some(Voice {
            language_code,
            name: self.name,
            gender: self.ssml_gender.unwrap_or(SsmlGender::SsmlVoiceGenderUnspecified),
        })
    }
}
