//! Voice processing: microphone capture, utterance endpointing, STT, TTS,
//! and playback

pub mod capture;
pub mod endpoint;
pub mod playback;
pub mod stt;
pub mod tts;

use std::time::Duration;

pub use capture::{AudioCapture, SAMPLE_RATE, encode_wav};
pub use endpoint::{EndpointState, PAUSE_THRESHOLD, UtteranceDetector};
pub use playback::AudioPlayback;
pub use stt::{DEFAULT_LOCALE, SpeechToText, samples_to_pcm};
pub use tts::{AudioArtifact, DEFAULT_VOICE, TextToSpeech};

use crate::error::RecognitionError;
use crate::{Error, Result};

/// Poll interval while draining the capture buffer
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Record one utterance from the microphone and transcribe it
///
/// Calibrates against ambient noise, records until the speaker pauses,
/// then sends the audio to the recognition service. Speech that never
/// starts within `wait_timeout` yields `RecognitionError::NoSpeech`.
///
/// # Errors
///
/// Returns a typed `RecognitionError` for capture and recognition
/// failures; the caller decides how to present them
#[allow(clippy::future_not_send)]
pub async fn capture_utterance(stt: &SpeechToText, wait_timeout: Duration) -> Result<String> {
    let mut mic = AudioCapture::new()?;
    let mut detector = UtteranceDetector::new(SAMPLE_RATE);

    mic.start()?;
    tracing::info!("listening, speak naturally");

    let utterance = loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let chunk = mic.take_buffer();
        if detector.process(&chunk) {
            break detector.take_utterance();
        }

        if detector.state() == EndpointState::Waiting && detector.waited() > wait_timeout {
            mic.stop();
            tracing::warn!(timeout = ?wait_timeout, "no speech detected");
            return Err(Error::Recognition(RecognitionError::NoSpeech));
        }
    };
    mic.stop();

    tracing::debug!(samples = utterance.len(), "utterance captured");
    let pcm = samples_to_pcm(&utterance);
    stt.transcribe(&pcm, SAMPLE_RATE).await
}
