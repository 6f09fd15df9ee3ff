//! Round-trip tests — writing an imported document and reading it back
//! gives the same document.

use canorusml::{parse_file, parse_str, write_document, Document};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn round_trip(doc: &Document) -> Document {
    let xml = write_document(doc).expect("Failed to write document");
    parse_str(&xml).unwrap_or_else(|e| panic!("written document does not read back: {e}\n{xml}"))
}

#[test]
fn chorale_round_trip() {
    let doc = parse_file(fixture("chorale.xml")).unwrap();
    let again = round_trip(&doc);
    assert_eq!(again, doc);
}

#[test]
fn written_form_is_stable() {
    let doc = parse_file(fixture("chorale.xml")).unwrap();
    let first = write_document(&doc).unwrap();
    let second = write_document(&round_trip(&doc)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn repaired_voices_survive_the_round_trip() {
    let doc = parse_file(fixture("chorale.xml")).unwrap();
    let again = round_trip(&doc);
    let lower = again.sheets[0].staff("Lower").unwrap();
    assert_eq!(lower.voices[1].signs.len(), 7);
    assert_eq!(lower.shared_sign_ids().len(), 6);
}

#[test]
fn chained_ties_round_trip() {
    let doc = parse_str(
        r#"<document title="Ties"><sheet name="S"><staff name="St"><voice name="V">
            <note playable-length="quarter" pitch="28" time-start="0"><tie/></note>
            <note playable-length="quarter" pitch="28" time-start="256"><tie/><slur-start/></note>
            <note playable-length="quarter" pitch="28" time-start="512"/>
            <note playable-length="quarter" pitch="29" time-start="768"><slur-end/></note>
        </voice></staff></sheet></document>"#,
    )
    .unwrap();
    let staff = doc.sheets[0].staff("St").unwrap();
    assert_eq!(staff.slurs().len(), 3);
    assert!(staff.slurs().iter().all(|s| s.note_end.is_some()));

    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn empty_metadata_and_version() {
    let doc = parse_str(r#"<document><sheet name="Only"/></document>"#).unwrap();
    assert_eq!(doc.canorus_version, None);
    assert_eq!(round_trip(&doc), doc);
}
