use assert_matches::assert_matches;
use camino_tempfile::tempdir;
use docent_conversation::Instructions;
use docent_document::fixture;
use pretty_assertions::assert_eq;
use test_log::test;

use super::*;
use crate::error::Error;

fn session() -> Session {
    Session::initialize(&Instructions::default())
}

#[test]
fn test_upload_sets_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    fs::write(&path, fixture::pdf(&["Quarterly revenue grew 12%."]).unwrap()).unwrap();

    let mut session = session();
    let chars = upload(&mut session, &Extractor::default(), &path).unwrap();

    assert_eq!(chars, 27);
    assert_eq!(
        session.document().get(),
        Some("Quarterly revenue grew 12%.")
    );
}

#[test]
fn test_failed_upload_keeps_previous_document() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("report.pdf");
    let scan = dir.path().join("scan.pdf");
    let text = dir.path().join("notes.txt");
    fs::write(&good, fixture::pdf(&["Quarterly revenue grew 12%."]).unwrap()).unwrap();
    fs::write(&scan, fixture::pdf(&[""]).unwrap()).unwrap();
    fs::write(&text, "plain text, not a PDF").unwrap();

    let extractor = Extractor::default();
    let mut session = session();
    upload(&mut session, &extractor, &good).unwrap();

    assert_matches!(
        upload(&mut session, &extractor, &scan),
        Err(Error::Document(docent_document::Error::NoTextFound))
    );
    assert_matches!(
        upload(&mut session, &extractor, &text),
        Err(Error::Document(docent_document::Error::ParseFailed(_)))
    );
    assert_matches!(
        upload(&mut session, &extractor, &dir.path().join("missing.pdf")),
        Err(Error::Io(_))
    );

    assert_eq!(
        session.document().get(),
        Some("Quarterly revenue grew 12%.")
    );
}

#[test]
fn test_upload_replaces_document() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    fs::write(&first, fixture::pdf(&["The first document."]).unwrap()).unwrap();
    fs::write(&second, fixture::pdf(&["The second document."]).unwrap()).unwrap();

    let extractor = Extractor::default();
    let mut session = session();
    upload(&mut session, &extractor, &first).unwrap();
    upload(&mut session, &extractor, &second).unwrap();

    assert_eq!(session.document().get(), Some("The second document."));
}
