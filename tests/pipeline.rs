//! Turn pipeline integration tests
//!
//! Covers the controller's input gating, transcript ordering, text
//! cleanup, and artifact lifecycle. No network calls are made: turns
//! that would reach the generation API are exercised at the
//! request-builder level in unit tests instead.

use secrecy::SecretString;

use triaid::voice::AudioArtifact;
use triaid::{
    InteractionController, ResponseGenerator, Session, Speaker, TranscriptEntry, TurnInput,
    normalize,
};

fn controller() -> InteractionController {
    let generator = ResponseGenerator::new(
        reqwest::Client::new(),
        SecretString::from("test-key".to_string()),
        "gemini-2.5-flash".to_string(),
    )
    .unwrap();
    InteractionController::new(generator, None)
}

#[tokio::test]
async fn empty_text_input_starts_no_turn() {
    let mut controller = controller();
    let mut session = Session::new();

    let outcome = controller
        .handle(&mut session, TurnInput::Text(String::new()))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert!(session.is_empty());
}

#[tokio::test]
async fn whitespace_only_input_starts_no_turn() {
    let mut controller = controller();
    let mut session = Session::new();

    let outcome = controller
        .handle(&mut session, TurnInput::Text("   \n\t ".to_string()))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert!(session.is_empty());
}

#[test]
fn transcript_orders_turns_chronologically() {
    let mut session = Session::new();
    session.push_turn("Hi", "Hello");
    session.push_turn("I feel unwell", "Tell me more about your symptoms");

    let entries = session.all();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0], TranscriptEntry::user("Hi"));
    assert_eq!(entries[1], TranscriptEntry::assistant("Hello"));
    assert_eq!(entries[2].speaker, Speaker::User);
    assert_eq!(entries[3].speaker, Speaker::Assistant);
}

#[test]
fn every_user_entry_is_followed_by_assistant_entry() {
    let mut session = Session::new();
    session.push_turn("one", "reply one");
    session.push_turn("two", "reply two");
    session.push_turn("three", "reply three");

    for pair in session.all().chunks(2) {
        assert_eq!(pair[0].speaker, Speaker::User);
        assert_eq!(pair[1].speaker, Speaker::Assistant);
    }
}

#[test]
fn normalize_prepares_generated_reply_for_speech() {
    let reply = "**Drink plenty of fluids.**\n\n- Rest well\n- Avoid `caffeine`";
    let cleaned = normalize(reply);

    assert_eq!(
        cleaned,
        "Drink plenty of fluids. Rest well Avoid caffeine"
    );
    assert_eq!(normalize(&cleaned), cleaned);
}

#[test]
fn artifact_lifecycle_is_scoped() {
    let path = {
        let artifact = AudioArtifact::from_mp3(b"synthesized audio").unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        path
    };

    // Dropping the owner removes the file
    assert!(!path.exists());
}
