//! Integration tests — import the fixture documents in tests/fixtures/ and
//! check the failure modes of the importer.

use canorusml::{
    parse_file, parse_str, parse_str_with_options, ClefType, Document, ErrorKind, ImportOptions,
    SignKind, SignType, SlurKind, SlurStyle, StemDirection,
};
use std::io::Write;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn chorale() -> Document {
    parse_file(fixtures_dir().join("chorale.xml")).expect("Failed to parse chorale.xml")
}

// ─── Fixture document ────────────────────────────────────────────────

#[test]
fn chorale_metadata() {
    let doc = chorale();
    assert_eq!(doc.title, "Chorale in G");
    assert_eq!(doc.composer, "J. S. Bach");
    assert_eq!(doc.poet, "Philipp Nicolai");
    assert_eq!(doc.arranger, "");
    assert_eq!(doc.time_edited, 3600);
    assert_eq!(doc.canorus_version.as_deref(), Some("0.7.3"));
    assert_eq!(
        doc.date_created.map(|d| d.to_string()).as_deref(),
        Some("2008-05-11 14:03:20")
    );
    assert!(doc.date_last_modified.is_some());

    assert_eq!(doc.sheets.len(), 1);
    let sheet = &doc.sheets[0];
    assert_eq!(sheet.name, "Chorale");
    let names: Vec<&str> = sheet.contexts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Verse", "Upper", "Lower", "Harmony"]);
    assert_eq!(doc.staff_count(), 2);
}

#[test]
fn chorale_voices() {
    let doc = chorale();
    let sheet = &doc.sheets[0];
    let upper = sheet.staff("Upper").expect("Upper staff");
    assert_eq!(upper.number_of_lines, 5);

    let voices: Vec<(&str, usize, StemDirection)> = upper
        .voices
        .iter()
        .map(|v| (v.name.as_str(), v.number, v.stem_direction))
        .collect();
    assert_eq!(
        voices,
        vec![
            ("Soprano", 1, StemDirection::Up),
            ("Alto", 2, StemDirection::Down),
        ]
    );

    let lower = sheet.staff("Lower").expect("Lower staff");
    assert_eq!(lower.voices[1].name, "Tenor");
    assert_eq!(lower.voices[1].stem_direction, StemDirection::Neutral);
}

#[test]
fn chorale_shares_staff_wide_signs() {
    let doc = chorale();
    let upper = doc.sheets[0].staff("Upper").unwrap();

    // clef, key, time and three barlines, once each
    assert_eq!(upper.shared_sign_ids().len(), 6);
    // plus five playables in the soprano and three in the alto
    assert_eq!(upper.signs().len(), 14);

    let soprano = &upper.voices[0];
    let alto = &upper.voices[1];
    assert_eq!(soprano.signs[0], alto.signs[0]);
    let shared_in_both = upper
        .shared_sign_ids()
        .iter()
        .all(|&id| soprano.contains(id) && alto.contains(id));
    assert!(shared_in_both);

    let times: Vec<i32> = upper
        .shared_signs()
        .map(|(_, s)| s.time_start)
        .collect();
    assert_eq!(times, vec![0, 0, 0, 768, 1536, 2304]);
}

#[test]
fn chorale_note_lengths() {
    let doc = chorale();
    let upper = doc.sheets[0].staff("Upper").unwrap();
    let lengths: Vec<(i32, i32)> = upper
        .voice_signs(&upper.voices[0])
        .filter(|s| s.is_playable())
        .map(|s| (s.time_start, s.time_length))
        .collect();
    assert_eq!(
        lengths,
        vec![(0, 256), (256, 512), (768, 768), (1536, 256), (1792, 512)]
    );
}

#[test]
fn chorale_slurs_and_ties() {
    let doc = chorale();
    let upper = doc.sheets[0].staff("Upper").unwrap();
    let soprano: Vec<_> = upper.voices[0]
        .signs
        .iter()
        .copied()
        .filter(|&id| upper.note(id).is_some())
        .collect();

    let first = upper.note(soprano[0]).unwrap();
    let slur = upper.slur(first.slur_start.expect("slur start")).unwrap();
    assert_eq!(slur.kind, SlurKind::Slur);
    assert_eq!(slur.note_end, Some(soprano[1]));
    assert_eq!(upper.note(soprano[1]).unwrap().slur_end, first.slur_start);

    let tied = upper.note(soprano[2]).unwrap();
    let tie = upper.slur(tied.tie_start.expect("tie start")).unwrap();
    assert_eq!(tie.kind, SlurKind::Tie);
    assert_eq!(tie.style, SlurStyle::Dotted);
    assert_eq!(tie.note_start, soprano[2]);
    assert_eq!(tie.note_end, Some(soprano[3]));

    let alto: Vec<_> = upper.voices[1]
        .signs
        .iter()
        .copied()
        .filter(|&id| upper.note(id).is_some())
        .collect();
    let phrase = upper
        .slur(upper.note(alto[0]).unwrap().phrasing_slur_start.unwrap())
        .unwrap();
    assert_eq!(phrase.kind, SlurKind::PhrasingSlur);
    assert_eq!(phrase.note_end, Some(alto[1]));
}

#[test]
fn chorale_lyrics_resolve_forward_references() {
    let doc = chorale();
    let sheet = &doc.sheets[0];
    let verse = sheet.lyrics_context("Verse").unwrap();
    assert_eq!(verse.stanza_number, 1);

    let voice = verse.associated_voice.and_then(|r| sheet.voice(r)).unwrap();
    assert_eq!(voice.name, "Soprano");

    let texts: Vec<&str> = verse.syllables.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Wach", "auf", "ruft"]);
    assert!(verse.syllables[0].hyphen);
    assert!(verse.syllables[2].melisma);
    assert!(verse
        .syllables
        .iter()
        .all(|s| s.associated_voice == verse.associated_voice));
}

#[test]
fn chorale_function_markings() {
    let doc = chorale();
    let harmony = doc.sheets[0].function_marking_context("Harmony").unwrap();
    let keys: Vec<&str> = harmony.markings.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["G", "G", "C"]);
    assert_eq!(harmony.markings[1].function.as_ml(), "D");
}

#[test]
fn chorale_repair_fills_sparse_voice() {
    let doc = chorale();
    let lower = doc.sheets[0].staff("Lower").unwrap();
    let tenor: Vec<SignType> = lower
        .voice_signs(&lower.voices[1])
        .map(|s| s.sign_type())
        .collect();
    assert_eq!(
        tenor,
        vec![
            SignType::Clef,
            SignType::KeySignature,
            SignType::TimeSignature,
            SignType::Note,
            SignType::Barline,
            SignType::Barline,
            SignType::Barline,
        ]
    );
    assert_eq!(lower.voices[0].signs[0], lower.voices[1].signs[0]);
}

#[test]
fn repair_can_be_disabled() {
    let xml = std::fs::read_to_string(fixtures_dir().join("chorale.xml")).unwrap();
    let options = ImportOptions {
        repair_voices: false,
        ..ImportOptions::default()
    };
    let doc = parse_str_with_options(&xml, &options).unwrap();
    let lower = doc.sheets[0].staff("Lower").unwrap();
    assert_eq!(lower.voices[1].signs.len(), 1);
}

#[test]
fn parse_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"<document title="Scratch"><sheet><staff><voice/></staff></sheet></document>"#
    )
    .unwrap();
    let doc = parse_file(file.path()).unwrap();
    assert_eq!(doc.title, "Scratch");
    assert_eq!(doc.sheets[0].name, "Sheet1");
    let staff = doc.sheets[0].staff("Staff1").unwrap();
    assert_eq!(staff.voices[0].name, "Voice1");
}

// ─── Scenarios ───────────────────────────────────────────────────────

#[test]
fn two_voices_share_one_treble_clef() {
    let doc = parse_str(
        r#"<document><sheet name="S"><staff name="St">
            <voice name="V1"><clef clef-type="treble" c1="-2" time-start="0"/></voice>
            <voice name="V2"><clef clef-type="treble" c1="-2" time-start="0"/></voice>
        </staff></sheet></document>"#,
    )
    .unwrap();
    let staff = doc.sheets[0].staff("St").unwrap();
    assert_eq!(staff.signs().len(), 1);
    assert_eq!(staff.voices[0].signs, staff.voices[1].signs);
    assert!(matches!(
        staff.signs()[0].kind,
        SignKind::Clef(c) if c.clef_type == ClefType::Treble
    ));
}

#[test]
fn lyrics_index_zero_is_first_voice() {
    let doc = parse_str(
        r#"<document><sheet>
            <staff name="St"><voice name="First"/><voice name="Second"/></staff>
            <lyrics-context name="L" associated-voice-idx="0"/>
        </sheet></document>"#,
    )
    .unwrap();
    let sheet = &doc.sheets[0];
    let lyrics = sheet.lyrics_context("L").unwrap();
    assert_eq!(
        lyrics.associated_voice.and_then(|r| sheet.voice(r)).map(|v| v.name.as_str()),
        Some("First")
    );
}

#[test]
fn staff_without_sheet_mentions_sheet() {
    let err = parse_str("<document>\n  <staff name=\"St\"/>\n</document>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::StructuralPrecondition(_)));
    assert!(err.message().contains("sheet"), "{err}");
    let pos = err.position().expect("position");
    assert_eq!((pos.line, pos.column), (2, 3));
}

#[test]
fn out_of_range_voice_index_fails_at_sheet_close() {
    let err = parse_str(
        "<document><sheet name=\"S\">\n\
         <staff><voice/></staff>\n\
         <lyrics-context associated-voice-idx=\"1\"/>\n\
         </sheet></document>",
    )
    .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::UnresolvedReference {
            index: 1,
            voice_count: 1,
            ..
        }
    ));
    assert_eq!(err.position().map(|p| p.line), Some(4));
}

#[test]
fn slur_without_end_fails() {
    let err = parse_str(
        r#"<document><sheet><staff><voice>
            <note pitch="30" time-start="0"><slur-start/></note>
            <note pitch="31" time-start="256"/>
        </voice></staff></sheet></document>"#,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedSlurPairing(_)));
}

#[test]
fn syllable_voice_index_out_of_range() {
    let err = parse_str(
        r#"<document><sheet name="Sheet1"><staff><voice/></staff>
            <lyrics-context name="L" associated-voice-idx="0">
                <syllable text="a" time-start="0" time-length="256" associated-voice-idx="3"/>
            </lyrics-context>
        </sheet></document>"#,
    )
    .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::UnresolvedReference {
            index: 3,
            voice_count: 1,
            ..
        }
    ));
    assert!(err.message().contains("syllable 'a'"), "{err}");
    assert!(err.message().contains("'Sheet1'"), "{err}");
}

#[test]
fn phrasing_slur_end_without_start_fails() {
    let err = parse_str(
        r#"<document><sheet><staff><voice>
            <note pitch="30" time-start="0"><phrasing-slur-end/></note>
        </voice></staff></sheet></document>"#,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedSlurPairing(_)));
    assert!(err.message().contains("phrasing-slur-end"), "{err}");
}

#[test]
fn sheet_nested_in_sheet_fails() {
    let err = parse_str(
        r#"<document><sheet name="A"><staff name="X"><voice/></staff>
            <lyrics-context name="L" associated-voice-idx="0"/>
            <sheet name="B"><staff name="Y"><voice/></staff></sheet>
        </sheet></document>"#,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::StructuralPrecondition(_)));
    assert!(err.message().contains("'B'"), "{err}");
    assert_eq!(err.position().map(|p| p.line), Some(3));
}

#[test]
fn unclosed_document_is_a_markup_error() {
    let err = parse_str(r#"<document><sheet name="S">"#).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Markup(_)));
}

#[test]
fn missing_document_element() {
    let err = parse_str("<canorus-document/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::StructuralPrecondition(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = parse_file(fixtures_dir().join("no-such-file.xml")).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(_)));
    assert!(err.to_string().contains("no-such-file.xml"));
}

#[test]
fn unknown_values_fall_back_to_defaults() {
    let doc = parse_str(
        r#"<document><sheet><staff><voice stem-direction="sideways">
            <clef clef-type="violin" time-start="0"/>
            <note playable-length="8" pitch="abc" time-start="0"/>
        </voice></staff></sheet></document>"#,
    )
    .unwrap();
    let staff = doc.sheets[0].staffs().next().unwrap();
    assert_eq!(staff.voices[0].stem_direction, StemDirection::Neutral);
    let signs: Vec<_> = staff.voice_signs(&staff.voices[0]).collect();
    assert!(matches!(signs[0].kind, SignKind::Clef(c) if c.clef_type == ClefType::Treble));
    let note = signs[1].as_note().unwrap();
    assert_eq!(note.pitch, 0);
    assert_eq!(signs[1].time_length, 128);
}

#[test]
fn nesting_limit() {
    let options = ImportOptions {
        max_depth: 3,
        ..ImportOptions::default()
    };
    let err = parse_str_with_options(
        "<document><sheet><staff><voice/></staff></sheet></document>",
        &options,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Markup(_)));
}
