//! Interaction controller
//!
//! Drives one turn per user interaction: input → generation → speech
//! synthesis → transcript update. The session object is passed in by the
//! host on every call, mirroring a rerun-on-interaction UI. No failure
//! here is fatal to the process.

use crate::generate::{ImagePayload, ResponseGenerator};
use crate::transcript::Session;
use crate::voice::TextToSpeech;
use crate::voice::tts::AudioArtifact;
use crate::{Error, Result};

/// Transcript placeholder for image-only user entries
const IMAGE_ENTRY_TEXT: &str = "[uploaded image]";

/// Turn lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingInput,
    Generating,
    Synthesizing,
    Displaying,
}

/// One user action handed to the controller
#[derive(Debug)]
pub enum TurnInput {
    /// Typed text or a transcribed utterance
    Text(String),
    /// An uploaded image; accompanying typed text is discarded before it
    /// reaches the generation API (intentional multimodal precedence)
    Image {
        payload: ImagePayload,
        accompanying_text: Option<String>,
    },
}

/// What a completed turn produced
#[derive(Debug)]
pub struct TurnOutcome {
    /// Assistant reply (or user-visible error text)
    pub reply: String,
    /// Synthesized speech; `None` when synthesis failed or was skipped
    pub audio: Option<AudioArtifact>,
    /// Whether the reply is an error entry rather than a generated one
    pub is_error: bool,
}

/// Orchestrates generation and synthesis over one session
pub struct InteractionController {
    generator: ResponseGenerator,
    synthesizer: Option<TextToSpeech>,
    state: TurnState,
}

impl InteractionController {
    /// Create a controller
    ///
    /// Synthesis is optional so the pipeline still works without a TTS
    /// key; turns then complete silently.
    #[must_use]
    pub fn new(generator: ResponseGenerator, synthesizer: Option<TextToSpeech>) -> Self {
        Self {
            generator,
            synthesizer,
            state: TurnState::Idle,
        }
    }

    /// Current phase, mostly useful for the host display
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Handle one user interaction
    ///
    /// Empty input is not an error: the turn simply does not start and
    /// `Ok(None)` is returned with the transcript untouched. Upstream
    /// generation failures become a user-visible error entry; the
    /// user/assistant pairing invariant holds either way.
    ///
    /// # Errors
    ///
    /// Only infrastructure errors escape; all per-turn service failures
    /// are folded into the outcome
    pub async fn handle(
        &mut self,
        session: &mut Session,
        input: TurnInput,
    ) -> Result<Option<TurnOutcome>> {
        self.state = TurnState::AwaitingInput;

        let (prompt_text, image, user_entry) = match input {
            TurnInput::Text(text) => {
                if text.trim().is_empty() {
                    tracing::debug!("empty input, turn not started");
                    return Ok(None);
                }
                let entry = text.clone();
                (Some(text), None, entry)
            }
            TurnInput::Image {
                payload,
                accompanying_text,
            } => {
                // Typed text still shows in the transcript but is never
                // sent upstream: the image takes precedence
                let entry = match accompanying_text {
                    Some(text) if !text.trim().is_empty() => {
                        tracing::debug!(chars = text.len(), "typed text not sent, image takes precedence");
                        text
                    }
                    _ => IMAGE_ENTRY_TEXT.to_string(),
                };
                (None, Some(payload), entry)
            }
        };

        session.is_playing = false;
        self.state = TurnState::Generating;

        let reply = match self
            .generator
            .generate(prompt_text.as_deref(), image.as_ref())
            .await
        {
            Ok(reply) => reply,
            Err(Error::Upstream(message)) => {
                tracing::error!(error = %message, "generation failed, recording error entry");
                session.push_turn(
                    user_entry,
                    format!("Sorry, I could not reach the assistant: {message}"),
                );
                self.state = TurnState::AwaitingInput;
                return Ok(Some(TurnOutcome {
                    reply: session
                        .all()
                        .last()
                        .map(|e| e.text.clone())
                        .unwrap_or_default(),
                    audio: None,
                    is_error: true,
                }));
            }
            Err(e) => return Err(e),
        };

        session.push_turn(user_entry, reply.clone());

        self.state = TurnState::Synthesizing;
        let audio = match &self.synthesizer {
            Some(tts) => match tts.synthesize_to_file(&reply).await {
                Ok(artifact) => {
                    session.is_playing = true;
                    Some(artifact)
                }
                Err(e) => {
                    // Degraded turn: reply still shown, just no audio
                    tracing::warn!(error = %e, "synthesis failed, turn continues without audio");
                    None
                }
            },
            None => None,
        };

        self.state = TurnState::Displaying;
        let outcome = TurnOutcome {
            reply,
            audio,
            is_error: false,
        };

        // Request/response rendering cycle: no blocking display phase
        self.state = TurnState::AwaitingInput;
        Ok(Some(outcome))
    }
}
