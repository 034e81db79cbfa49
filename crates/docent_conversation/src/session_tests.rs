use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_log::test;

use super::*;

fn session() -> Session {
    Session::initialize(&Instructions::default())
}

#[test]
fn test_initialize() {
    let instructions = Instructions::default().with_rules(["Be brief."]);
    let session = Session::initialize(&instructions);

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(
        session.transcript().first(),
        Some(&Turn::system(instructions.render()))
    );
    assert!(session.document().is_empty());
    assert_eq!(session.visible_history().count(), 0);
}

#[test]
fn test_visible_history_never_contains_system() {
    let mut session = session();
    session.record_upload("Some document text.").unwrap();

    for i in 0..3 {
        session.submit(format!("question {i}"));
        session.complete_assistant_turn(format!("answer {i}"));
        assert!(session.visible_history().all(|t| t.role != Role::System));
    }
}

#[test]
fn test_transcript_length_after_submissions() {
    let mut session = session();

    for n in 1..=5 {
        session.submit("Q");
        session.complete_assistant_turn("A");
        assert_eq!(session.transcript().len(), 1 + 2 * n);
    }
}

#[test]
fn test_submit_without_document() {
    let mut session = session();
    session.submit("Hello?");
    session.complete_assistant_turn("Hi.");

    let payload = session.submit("What is this about?");

    assert_eq!(payload.turns(), session.transcript().as_slice());
}

#[test]
fn test_submit_with_document() {
    let mut session = session().with_min_text_len(1);
    session.record_upload("D").unwrap();

    let payload = session.submit("Q");

    assert_eq!(
        payload.turns().last().map(|t| t.content.as_str()),
        Some("Context Document:\nD\n\nUser Query: Q")
    );
    assert_eq!(session.transcript().last(), Some(&Turn::user("Q")));
    assert_eq!(payload.len(), session.transcript().len());
}

#[test]
fn test_submit_only_prefixes_the_latest_query() {
    let mut session = session();
    session.record_upload("The report covers 2024.").unwrap();

    session.submit("First?");
    session.complete_assistant_turn("First.");
    let payload = session.submit("Second?");

    let contents: Vec<_> = payload.messages().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec![
        "First?",
        "First.",
        "Context Document:\nThe report covers 2024.\n\nUser Query: Second?",
    ]);
}

#[test]
fn test_payload_system_turn_appears_once() {
    let mut session = session();
    session.record_upload("Document body text.").unwrap();
    let payload = session.submit("Q");

    let system: Vec<_> = payload
        .turns()
        .iter()
        .filter(|t| t.role == Role::System)
        .collect();

    assert_eq!(system.len(), 1);
    assert_eq!(payload.system(), Some(session.transcript().system()));
    assert!(payload.messages().all(|t| t.role != Role::System));
    assert_eq!(payload.messages().count(), 1);
}

#[test]
fn test_record_upload_below_threshold() {
    let mut session = session();

    let error = session.record_upload("ab").unwrap_err();

    assert_matches!(error, docent_document::Error::NoTextFound);
    assert!(session.document().is_empty());
}

#[test]
fn test_record_upload_failure_keeps_previous_document() {
    let mut session = session();
    session.record_upload("First document.").unwrap();

    assert!(session.record_upload("   ").is_err());
    assert_eq!(session.document().get(), Some("First document."));
}

#[test]
fn test_record_upload_stores_trimmed_text() {
    let mut session = session();
    session.record_upload("\n\n  Quarterly report.  \n").unwrap();

    assert_eq!(session.document().get(), Some("Quarterly report."));

    let payload = session.submit("Q");
    assert_eq!(
        payload.turns().last().map(|t| t.content.as_str()),
        Some("Context Document:\nQuarterly report.\n\nUser Query: Q")
    );
}

#[test]
fn test_record_upload_last_write_wins() {
    let mut session = session().with_min_text_len(1);
    session.record_upload("D1").unwrap();
    session.record_upload("D2").unwrap();

    assert_eq!(session.document().get(), Some("D2"));

    let payload = session.submit("Q");
    let last = payload.turns().last().unwrap();
    assert_eq!(last.content, "Context Document:\nD2\n\nUser Query: Q");
    assert!(!last.content.contains("D1"));
}

#[test]
fn test_visible_history_is_idempotent() {
    let mut session = session();
    session.submit("Q");
    session.complete_assistant_turn("A");

    let first: Vec<_> = session.visible_history().cloned().collect();
    let second: Vec<_> = session.visible_history().cloned().collect();
    assert_eq!(first, second);

    let history = session.visible_history();
    assert_eq!(history.clone().count(), history.count());
}

#[test]
fn test_failed_completion_appends_nothing() {
    let mut session = session();
    session.submit("Q");

    // No `complete_assistant_turn`, the model call failed.
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript().last(), Some(&Turn::user("Q")));

    let payload = session.submit("Q again");
    let roles: Vec<_> = payload.messages().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::User]);
}

#[test]
fn test_end_to_end() {
    let mut session = session();
    session.record_upload("Quarterly revenue grew 12%.").unwrap();

    let payload = session.submit("What grew?");
    assert_eq!(
        payload.turns().last().unwrap().content,
        "Context Document:\nQuarterly revenue grew 12%.\n\nUser Query: What grew?"
    );

    session.complete_assistant_turn("Revenue grew 12%.");

    let history: Vec<_> = session.visible_history().cloned().collect();
    assert_eq!(history, vec![
        Turn::user("What grew?"),
        Turn::assistant("Revenue grew 12%."),
    ]);
}

#[test]
fn test_role_serialization() {
    let turn = Turn::assistant("hi");
    let json = serde_json::to_string(&turn).unwrap();

    assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
}
