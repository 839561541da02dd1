//! TOML configuration file loading
//!
//! Supports `~/.config/triaid/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TriaidConfigFile {
    /// Generation (LLM) configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gemini-2.5-flash")
    pub model: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable speech capture and playback
    pub enabled: Option<bool>,

    /// Recognition locale (e.g. "en-IN")
    pub locale: Option<String>,

    /// TTS voice identity (e.g. `en-IN-NeerjaNeural`)
    pub tts_voice: Option<String>,

    /// Seconds to wait for speech before giving up
    pub wait_timeout_secs: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    /// Google API key (generation + speech recognition)
    pub google: Option<String>,

    /// Azure speech key (TTS)
    pub azure_speech: Option<String>,

    /// Azure speech region (e.g. "centralindia")
    pub azure_speech_region: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `TriaidConfigFile::default()` if the file doesn't exist or
/// can't be parsed.
#[must_use]
pub fn load_config_file() -> TriaidConfigFile {
    let Some(path) = config_file_path() else {
        return TriaidConfigFile::default();
    };

    if !path.exists() {
        return TriaidConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TriaidConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TriaidConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/triaid/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("triaid").join("config.toml"))
}
