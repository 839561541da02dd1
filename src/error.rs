//! Error types for `TriAID`

use thiserror::Error;

/// Result type alias for `TriAID` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Turn submitted with neither text nor image
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Speech recognition failure, carried as data rather than a
    /// placeholder transcript
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Remote generation service failure
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Why a speech capture attempt produced no transcript
///
/// The controller decides presentation; these never leak into the
/// transcript as fake utterance text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// Audio was captured but the service returned no transcript
    #[error("speech was not understood")]
    Unintelligible,

    /// Recognition service could not be reached
    #[error("speech recognition service unavailable")]
    ServiceUnavailable,

    /// No speech started before the wait timeout elapsed
    #[error("no speech detected")]
    NoSpeech,
}
