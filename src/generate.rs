//! Response generation via the Google generative-language API
//!
//! One blocking round trip per turn. No retry, no streaming.

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, prompt};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// An uploaded image forwarded to the generation API
///
/// Transient: built per request, dropped once the call returns.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// MIME type as reported by the upload (image/jpeg or image/png)
    pub mime_type: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Build a payload from a file path, inferring the MIME type from the
    /// extension
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or has an unsupported
    /// extension
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let mime_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            other => {
                return Err(Error::InvalidInput(format!(
                    "unsupported image type: {other:?} (expected jpg, jpeg, or png)"
                )));
            }
        };

        let bytes = std::fs::read(path)?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Build the request parts for a turn
///
/// An image takes precedence: the image instruction plus inline data are
/// sent and any accompanying text is dropped. Text-only turns embed the
/// patient text in the instruction.
fn build_parts(prompt_text: Option<&str>, image: Option<&ImagePayload>) -> Result<Vec<Part>> {
    match (image, prompt_text) {
        (Some(img), _) => Ok(vec![
            Part::Text {
                text: prompt::image_instruction().to_string(),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: img.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&img.bytes),
                },
            },
        ]),
        (None, Some(text)) if !text.trim().is_empty() => Ok(vec![Part::Text {
            text: prompt::text_instruction(text),
        }]),
        _ => Err(Error::InvalidInput(
            "a turn needs text or an image".to_string(),
        )),
    }
}

/// Generates assistant replies from text or image prompts
pub struct ResponseGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl ResponseGenerator {
    /// Create a new generator
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(client: reqwest::Client, api_key: SecretString, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "Google API key required for generation".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Generate a reply for a turn
    ///
    /// When an image is present it takes precedence and any accompanying
    /// text is not sent upstream. Returns the first textual candidate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if both text and image are absent, or
    /// `Upstream` if the remote call fails
    pub async fn generate(
        &self,
        prompt_text: Option<&str>,
        image: Option<&ImagePayload>,
    ) -> Result<String> {
        if let Some(img) = image {
            tracing::debug!(mime_type = %img.mime_type, bytes = img.bytes.len(), "image turn");
        }
        let parts = build_parts(prompt_text, image)?;

        let url = format!(
            "{GEMINI_API_BASE}/{}:generateContent?key={}",
            self.model,
            self.api_key.expose_secret()
        );

        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "generation request failed");
                Error::Upstream(format!("generation request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "generation API error");
            return Err(Error::Upstream(format!(
                "generation API error {status}: {body}"
            )));
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse generation response");
            Error::Upstream(format!("unparseable generation response: {e}"))
        })?;

        let reply = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| Error::Upstream("no candidates in generation response".to_string()))?;

        tracing::info!(chars = reply.len(), "reply generated");
        Ok(reply)
    }
}
