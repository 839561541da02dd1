//! Speech-to-text via the Google Cloud Speech API

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::error::RecognitionError;
use crate::{Error, Result};

const SPEECH_API_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";

/// Recognition locale, matching the voices this assistant speaks with
pub const DEFAULT_LOCALE: &str = "en-IN";

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'a str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(serde::Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(serde::Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognizeResult>,
}

#[derive(serde::Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternatives: Vec<RecognizeAlternative>,
}

#[derive(serde::Deserialize)]
struct RecognizeAlternative {
    transcript: String,
}

/// Transcribes captured utterances
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    locale: String,
}

impl SpeechToText {
    /// Create a new STT instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(client: reqwest::Client, api_key: SecretString, locale: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "Google API key required for speech recognition".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_key,
            locale,
        })
    }

    /// Transcribe 16-bit PCM audio
    ///
    /// # Arguments
    ///
    /// * `pcm` - raw LINEAR16 sample bytes (not a WAV container)
    /// * `sample_rate` - capture sample rate in Hz
    ///
    /// # Errors
    ///
    /// Returns `RecognitionError::ServiceUnavailable` if the service
    /// cannot be reached and `RecognitionError::Unintelligible` if it
    /// returns no transcript
    pub async fn transcribe(&self, pcm: &[u8], sample_rate: u32) -> Result<String> {
        tracing::debug!(audio_bytes = pcm.len(), locale = %self.locale, "starting transcription");

        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: sample_rate,
                language_code: &self.locale,
            },
            audio: RecognitionAudio {
                content: base64::engine::general_purpose::STANDARD.encode(pcm),
            },
        };

        let url = format!("{SPEECH_API_URL}?key={}", self.api_key.expose_secret());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "recognition request failed");
                Error::Recognition(RecognitionError::ServiceUnavailable)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "recognition API error");
            return Err(Error::Recognition(RecognitionError::ServiceUnavailable));
        }

        let result: RecognizeResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse recognition response");
            Error::Recognition(RecognitionError::ServiceUnavailable)
        })?;

        let transcript = result
            .results
            .into_iter()
            .filter_map(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .collect::<Vec<_>>()
            .join(" ");

        if transcript.trim().is_empty() {
            tracing::warn!("recognition returned no transcript");
            return Err(Error::Recognition(RecognitionError::Unintelligible));
        }

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

/// Convert f32 samples to raw LINEAR16 bytes (little endian)
#[must_use]
pub fn samples_to_pcm(samples: &[f32]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let value = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        pcm.extend_from_slice(&value.to_le_bytes());
    }
    pcm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm_encoding_is_little_endian_16_bit() {
        let pcm = samples_to_pcm(&[0.0, 1.0, -1.0]);
        assert_eq!(pcm.len(), 6);
        assert_eq!(&pcm[0..2], &[0x00, 0x00]);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), 32767);
        assert_eq!(i16::from_le_bytes([pcm[4], pcm[5]]), -32767);
    }

    #[test]
    fn pcm_clamps_out_of_range_samples() {
        let pcm = samples_to_pcm(&[2.0, -2.0]);
        assert_eq!(i16::from_le_bytes([pcm[0], pcm[1]]), 32767);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), -32768);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let result = SpeechToText::new(
            reqwest::Client::new(),
            SecretString::from(String::new()),
            DEFAULT_LOCALE.to_string(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
