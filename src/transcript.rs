//! In-memory session transcript
//!
//! Append-only, chronological, alive for one session. Nothing here is
//! persisted.

use serde::Serialize;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One immutable line of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// One user visit: the ordered transcript plus the playback flag
///
/// Passed by reference into the turn handler on every interaction; never
/// stored in global state.
#[derive(Debug, Default, Serialize)]
pub struct Session {
    entries: Vec<TranscriptEntry>,
    /// Whether synthesized audio from the last turn is playing
    pub is_playing: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry, preserving arrival order
    pub fn append(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Append a completed turn: user entry immediately followed by the
    /// assistant entry
    pub fn push_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.entries.push(TranscriptEntry::user(user));
        self.entries.push(TranscriptEntry::assistant(assistant));
    }

    /// All entries in chronological order
    #[must_use]
    pub fn all(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_append_order() {
        let mut session = Session::new();
        session.append(TranscriptEntry::user("Hi"));
        session.append(TranscriptEntry::assistant("Hello"));

        let entries = session.all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], TranscriptEntry::user("Hi"));
        assert_eq!(entries[1], TranscriptEntry::assistant("Hello"));
    }

    #[test]
    fn push_turn_pairs_user_then_assistant() {
        let mut session = Session::new();
        session.push_turn("I feel dizzy", "How long has this been going on?");

        assert_eq!(session.len(), 2);
        assert_eq!(session.all()[0].speaker, Speaker::User);
        assert_eq!(session.all()[1].speaker, Speaker::Assistant);
    }

    #[test]
    fn new_session_is_empty() {
        let session = Session::new();
        assert!(session.is_empty());
        assert!(!session.is_playing);
    }

    #[test]
    fn speaker_serializes_lowercase() {
        let entry = TranscriptEntry::user("Hi");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"speaker\":\"user\""));
    }
}
