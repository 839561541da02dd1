//! `TriAID` - voice-enabled conversational medical assistant pipeline
//!
//! This library provides the turn pipeline behind the `TriAID` assistant:
//! - Input collection (typed text, microphone utterances, images)
//! - Reply generation via the Google generative-language API
//! - Text cleanup and speech synthesis via a remote neural TTS voice
//! - An in-memory session transcript
//!
//! # Architecture
//!
//! ```text
//! user action
//!     │
//! ┌───▼─────────────────────────────────────────────┐
//! │            Interaction Controller               │
//! │  (one invocation per interaction, per session)  │
//! └───┬─────────────────────────────────────────────┘
//!     │ mic? ──► capture ──► endpoint ──► STT
//!     │
//!     ├──► Response Generator (text | image)
//!     ├──► Text Normalizer ──► Speech Synthesizer
//!     └──► Session Transcript ──► display + playback
//! ```
//!
//! Each turn is independent: upstream failures surface as error entries,
//! never process aborts. Nothing is persisted beyond the session.

pub mod config;
pub mod controller;
pub mod error;
pub mod generate;
pub mod normalize;
pub mod prompt;
pub mod transcript;
pub mod voice;

pub use config::Config;
pub use controller::{InteractionController, TurnInput, TurnOutcome, TurnState};
pub use error::{Error, RecognitionError, Result};
pub use generate::{ImagePayload, ResponseGenerator};
pub use normalize::normalize;
pub use transcript::{Session, Speaker, TranscriptEntry};
pub use voice::{AudioArtifact, AudioCapture, AudioPlayback, SpeechToText, TextToSpeech};
