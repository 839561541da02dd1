//! Configuration management

pub mod file;

use std::time::Duration;

use crate::voice::{DEFAULT_LOCALE, DEFAULT_VOICE};
use crate::{Error, Result};

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default wait for speech to begin before giving up
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration
///
/// Merged from defaults, the optional TOML file, and environment
/// variables, in that order. Environment wins.
#[derive(Debug)]
pub struct Config {
    /// Generation model identifier
    pub model: String,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Voice processing configuration
#[derive(Debug)]
pub struct VoiceConfig {
    /// Enable speech capture and playback
    pub enabled: bool,

    /// Recognition locale
    pub locale: String,

    /// TTS voice identity
    pub tts_voice: String,

    /// How long to wait for speech before reporting no-speech
    pub wait_timeout: Duration,
}

/// API keys for external services
///
/// Held as plain strings here; wrapped in `SecretString` at client
/// construction.
#[derive(Debug)]
pub struct ApiKeys {
    /// Google API key (generation + speech recognition), required
    pub google: String,

    /// Azure speech key (TTS), optional; turns are silent without it
    pub azure_speech: Option<String>,

    /// Azure speech region
    pub azure_speech_region: Option<String>,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the required Google API key is missing
    pub fn load() -> Result<Self> {
        let file = file::load_config_file();

        let google = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or(file.api_keys.google)
            .ok_or_else(|| {
                Error::Config(
                    "GOOGLE_API_KEY is required (env var or api_keys.google in config.toml)"
                        .to_string(),
                )
            })?;

        let azure_speech = std::env::var("AZURE_SPEECH_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or(file.api_keys.azure_speech);

        let azure_speech_region = std::env::var("AZURE_SPEECH_REGION")
            .ok()
            .filter(|r| !r.is_empty())
            .or(file.api_keys.azure_speech_region);

        Ok(Self {
            model: file.llm.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            voice: VoiceConfig {
                enabled: file.voice.enabled.unwrap_or(true),
                locale: file
                    .voice
                    .locale
                    .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
                tts_voice: file
                    .voice
                    .tts_voice
                    .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
                wait_timeout: file
                    .voice
                    .wait_timeout_secs
                    .map_or(DEFAULT_WAIT_TIMEOUT, Duration::from_secs),
            },
            api_keys: ApiKeys {
                google,
                azure_speech,
                azure_speech_region,
            },
        })
    }
}
