use clap::Args;
use memrise_model::{AudioEncoding, Error, Result, SPEAKING_RATE_RANGE};
use memrise_speech::Credentials;
use secrecy::SecretString;
use std::time::Duration;

/// Options shared by every subcommand. Each can also come from the
/// environment or a `.env` file in the working directory.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Memrise username
    #[arg(long, global = true, env = "MEMRISE_USERNAME")]
    pub username: Option<String>,

    /// Memrise password
    #[arg(long, global = true, env = "MEMRISE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Google Cloud API key for Text-to-Speech
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// OAuth access token for Text-to-Speech (alternative to an API key)
    #[arg(long, global = true, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub google_access_token: Option<String>,

    /// Voice name (e.g., "ko-KR-Standard-A"); prompts with a list when unset
    #[arg(long = "voice", global = true, env = "MEMRISE_VOICE_NAME")]
    pub voice_name: Option<String>,

    /// Language code to synthesize in; defaults to the course's target language
    #[arg(long, global = true, env = "MEMRISE_LANGUAGE_CODE")]
    pub language_code: Option<String>,

    /// Speaking rate, 0.25 to 4.0
    #[arg(long, global = true, env = "MEMRISE_SPEAKING_RATE")]
    pub speaking_rate: Option<f32>,

    /// Audio encoding of the uploaded files
    #[arg(long, global = true, env = "MEMRISE_AUDIO_ENCODING", value_enum)]
    pub encoding: Option<EncodingArg>,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, global = true, env = "MEMRISE_TIMEOUT")]
    pub timeout: Option<u64>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EncodingArg {
    Mp3,
    Wav,
    Ogg,
}

impl From<EncodingArg> for AudioEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Mp3 => AudioEncoding::Mp3,
            EncodingArg::Wav => AudioEncoding::Linear16,
            EncodingArg::Ogg => AudioEncoding::OggOpus,
        }
    }
}

/// Validated configuration, built once at start-up.
pub struct Settings {
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub voice_name: Option<String>,
    pub language_code: Option<String>,
    pub speaking_rate: f32,
    pub encoding: AudioEncoding,
    pub timeout: Duration,
    google_api_key: Option<SecretString>,
    google_access_token: Option<SecretString>,
}

impl Settings {
    pub fn from_args(args: SettingsArgs) -> Result<Self> {
        let speaking_rate = args
            .speaking_rate
            .unwrap_or(memrise_model::DEFAULT_SPEAKING_RATE);
        if !SPEAKING_RATE_RANGE.contains(&speaking_rate) {
            return Err(Error::Config(format!(
                "speaking rate {speaking_rate} is outside {}..={}",
                SPEAKING_RATE_RANGE.start(),
                SPEAKING_RATE_RANGE.end()
            )));
        }

        let timeout = match args.timeout {
            Some(0) => return Err(Error::Config("timeout must be at least 1 second".into())),
            Some(secs) => Duration::from_secs(secs),
            None => memrise_client::DEFAULT_TIMEOUT,
        };

        Ok(Self {
            username: non_empty(args.username),
            password: non_empty(args.password).map(SecretString::from),
            voice_name: non_empty(args.voice_name),
            language_code: non_empty(args.language_code),
            speaking_rate,
            encoding: args.encoding.map(AudioEncoding::from).unwrap_or_default(),
            timeout,
            google_api_key: non_empty(args.google_api_key).map(SecretString::from),
            google_access_token: non_empty(args.google_access_token).map(SecretString::from),
        })
    }

    /// Take the speech API credentials; required by commands that synthesize.
    /// Exactly one of the API key and the access token must be set.
    pub fn take_tts_credentials(&mut self) -> Result<Credentials> {
        match (self.google_api_key.take(), self.google_access_token.take()) {
            (Some(key), None) => Ok(Credentials::ApiKey(key)),
            (None, Some(token)) => Ok(Credentials::AccessToken(token)),
            (Some(_), Some(_)) => Err(Error::Config(
                "set either GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN, not both".into(),
            )),
            (None, None) => Err(Error::Config(
                "no Text-to-Speech credentials: set GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN".into(),
            )),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
