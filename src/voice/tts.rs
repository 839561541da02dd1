//! Text-to-speech via the Azure Cognitive Services neural voices
//!
//! Synthesis is fully awaited: the artifact path is never handed back
//! before the audio bytes are on disk.

use std::io::Write;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;

use crate::normalize::normalize;
use crate::{Error, Result};

/// Default voice identity (Indian English neural voice)
pub const DEFAULT_VOICE: &str = "en-IN-NeerjaNeural";

/// MP3 output format requested from the service
const OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";

/// A synthesized speech file
///
/// Owns the temporary file exclusively; the file is deleted when the
/// artifact is dropped.
#[derive(Debug)]
pub struct AudioArtifact {
    path: tempfile::TempPath,
}

impl AudioArtifact {
    /// Write MP3 bytes to a fresh temp file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written
    pub fn from_mp3(audio: &[u8]) -> Result<Self> {
        let mut file = NamedTempFile::with_suffix(".mp3")?;
        file.write_all(audio)?;
        file.flush()?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Path to the audio file, valid for the artifact's lifetime
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the audio bytes back
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// Synthesizes speech from generated replies
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    region: String,
    voice: String,
}

impl TextToSpeech {
    /// Create a new TTS instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key or region is empty
    pub fn new(
        client: reqwest::Client,
        api_key: SecretString,
        region: String,
        voice: String,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("speech API key required for TTS".to_string()));
        }
        if region.is_empty() {
            return Err(Error::Config("speech region required for TTS".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            region,
            voice,
        })
    }

    /// Synthesize text to MP3 bytes
    ///
    /// The text is normalized for speech first.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails or yields no audio
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let speakable = normalize(text);
        if speakable.is_empty() {
            return Err(Error::Tts("nothing speakable after cleanup".to_string()));
        }

        let url = format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.region
        );
        let ssml = build_ssml(&self.voice, &speakable);

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", self.api_key.expose_secret())
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .body(ssml)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "TTS request failed");
                Error::Tts(format!("TTS request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS API error");
            return Err(Error::Tts(format!("TTS API error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(Error::Tts("TTS returned no audio".to_string()));
        }

        tracing::info!(bytes = audio.len(), voice = %self.voice, "speech synthesized");
        Ok(audio.to_vec())
    }

    /// Synthesize text and persist it as an owned artifact
    ///
    /// Blocks until the file is fully written; the returned path is
    /// always readable and non-empty.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or the file write fails
    pub async fn synthesize_to_file(&self, text: &str) -> Result<AudioArtifact> {
        let audio = self.synthesize(text).await?;
        AudioArtifact::from_mp3(&audio)
    }
}

/// Build the SSML request body
fn build_ssml(voice: &str, text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<speak version='1.0' xml:lang='en-IN'>\
         <voice name='{voice}'>{escaped}</voice>\
         </speak>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_exists_while_owned_and_removed_on_drop() {
        let artifact = AudioArtifact::from_mp3(b"ID3 fake mp3 payload").unwrap();
        let path = artifact.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(artifact.read().unwrap(), b"ID3 fake mp3 payload");

        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn artifact_is_never_empty() {
        let artifact = AudioArtifact::from_mp3(b"x").unwrap();
        let metadata = std::fs::metadata(artifact.path()).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn ssml_escapes_reserved_characters() {
        let ssml = build_ssml("en-IN-NeerjaNeural", "salt & water");
        assert!(ssml.contains("salt &amp; water"));
        assert!(ssml.contains("name='en-IN-NeerjaNeural'"));
    }

    #[test]
    fn empty_region_is_rejected() {
        let result = TextToSpeech::new(
            reqwest::Client::new(),
            SecretString::from("key".to_string()),
            String::new(),
            DEFAULT_VOICE.to_string(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
