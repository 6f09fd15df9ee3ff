//! CanorusML writer — serializes a [`Document`] into markup that reads
//! back into an equal document.
//!
//! Staff-wide signs are written into every voice that references them;
//! the reader folds the copies back into one sign. Ties are written on
//! their start note only, since reading connects them to the next note
//! of the same pitch.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::ExportError;
use crate::model::*;
use crate::parser::DATE_FORMAT;

type Attrs = Vec<(&'static str, String)>;

/// Serialize `document` as a CanorusML string.
pub fn write_document(document: &Document) -> Result<String, ExportError> {
    let mut out = Markup::new();
    out.event("xml", Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    out.start("canorus-document", &[])?;
    if let Some(version) = &document.canorus_version {
        out.text_element("canorus-version", version)?;
    }

    out.start("document", &document_attrs(document))?;
    for sheet in &document.sheets {
        write_sheet(&mut out, sheet)?;
    }
    out.end("document")?;

    out.end("canorus-document")?;
    out.finish()
}

fn document_attrs(document: &Document) -> Attrs {
    let mut attrs: Attrs = vec![
        ("title", document.title.clone()),
        ("subtitle", document.subtitle.clone()),
        ("composer", document.composer.clone()),
        ("arranger", document.arranger.clone()),
        ("poet", document.poet.clone()),
        ("text-translator", document.text_translator.clone()),
        ("copyright", document.copyright.clone()),
        ("dedication", document.dedication.clone()),
        ("comments", document.comments.clone()),
    ];
    if let Some(date) = document.date_created {
        attrs.push(("date-created", date.format(DATE_FORMAT).to_string()));
    }
    if let Some(date) = document.date_last_modified {
        attrs.push(("date-last-modified", date.format(DATE_FORMAT).to_string()));
    }
    attrs.push(("time-edited", document.time_edited.to_string()));
    attrs
}

fn write_sheet(out: &mut Markup, sheet: &Sheet) -> Result<(), ExportError> {
    let voices = sheet.voice_list();
    let voice_idx = |r: VoiceRef| voices.iter().position(|&v| v == r);

    out.start("sheet", &[("name", sheet.name.clone())])?;
    for context in &sheet.contexts {
        match &context.kind {
            ContextKind::Staff(staff) => write_staff(out, &context.name, staff)?,
            ContextKind::Lyrics(lyrics) => {
                let mut attrs: Attrs = vec![
                    ("name", context.name.clone()),
                    ("stanza-number", lyrics.stanza_number.to_string()),
                ];
                if let Some(i) = lyrics.associated_voice.and_then(voice_idx) {
                    attrs.push(("associated-voice-idx", i.to_string()));
                }
                out.start("lyrics-context", &attrs)?;
                for syllable in &lyrics.syllables {
                    let mut attrs: Attrs = vec![
                        ("text", syllable.text.clone()),
                        ("hyphen", flag(syllable.hyphen)),
                        ("melisma", flag(syllable.melisma)),
                        ("time-start", syllable.time_start.to_string()),
                        ("time-length", syllable.time_length.to_string()),
                    ];
                    if let Some(i) = syllable.associated_voice.and_then(voice_idx) {
                        attrs.push(("associated-voice-idx", i.to_string()));
                    }
                    out.empty("syllable", &attrs)?;
                }
                out.end("lyrics-context")?;
            }
            ContextKind::FunctionMarking(markings) => {
                out.start(
                    "function-marking-context",
                    &[("name", context.name.clone())],
                )?;
                for m in &markings.markings {
                    out.empty(
                        "function-marking",
                        &[
                            ("function", m.function.as_ml().to_string()),
                            ("minor", flag(m.minor)),
                            ("key", m.key.clone()),
                            ("time-start", m.time_start.to_string()),
                            ("time-length", m.time_length.to_string()),
                            ("chord-area", m.chord_area.as_ml().to_string()),
                            ("chord-area-minor", flag(m.chord_area_minor)),
                            ("tonic-degree", m.tonic_degree.as_ml().to_string()),
                            ("tonic-degree-minor", flag(m.tonic_degree_minor)),
                            ("ellipse", flag(m.ellipse)),
                        ],
                    )?;
                }
                out.end("function-marking-context")?;
            }
            // No CanorusML form; the reader never creates these.
            ContextKind::Tablature | ContextKind::Dynamics => {}
        }
    }
    out.end("sheet")
}

fn write_staff(out: &mut Markup, name: &str, staff: &Staff) -> Result<(), ExportError> {
    out.start(
        "staff",
        &[
            ("name", name.to_string()),
            ("number-of-lines", staff.number_of_lines.to_string()),
        ],
    )?;
    for voice in &staff.voices {
        out.start(
            "voice",
            &[
                ("name", voice.name.clone()),
                ("stem-direction", voice.stem_direction.as_ml().to_string()),
            ],
        )?;
        for sign in staff.voice_signs(voice) {
            write_sign(out, staff, sign)?;
        }
        out.end("voice")?;
    }
    out.end("staff")
}

fn write_sign(out: &mut Markup, staff: &Staff, sign: &Sign) -> Result<(), ExportError> {
    let time_start = ("time-start", sign.time_start.to_string());
    match &sign.kind {
        SignKind::Clef(c) => out.empty(
            "clef",
            &[
                ("clef-type", c.clef_type.as_ml().to_string()),
                ("c1", c.c1.to_string()),
                ("offset", c.offset.to_string()),
                time_start,
            ],
        ),
        SignKind::KeySignature(k) => {
            let mut attrs: Attrs = vec![
                ("key-signature-type", k.key_signature_type.as_ml().to_string()),
                ("accs", k.accs.to_string()),
                ("major-minor-gender", k.gender.as_ml().to_string()),
            ];
            if k.key_signature_type == KeySignatureType::Modus {
                attrs.push(("modus", k.modus.as_ml().to_string()));
            }
            attrs.push(time_start);
            out.empty("key-signature", &attrs)
        }
        SignKind::TimeSignature(t) => out.empty(
            "time-signature",
            &[
                ("beats", t.beats.to_string()),
                ("beat", t.beat.to_string()),
                ("time-signature-type", t.time_signature_type.as_ml().to_string()),
                time_start,
            ],
        ),
        SignKind::Barline(b) => out.empty(
            "barline",
            &[("barline-type", b.barline_type.as_ml().to_string()), time_start],
        ),
        SignKind::Note(n) => {
            let mut attrs = length_attrs(&n.playable_length);
            attrs.push(("pitch", n.pitch.to_string()));
            attrs.push(("accs", n.accs.to_string()));
            attrs.push(time_start);
            attrs.push(("stem-direction", n.stem_direction.as_ml().to_string()));

            let children = note_children(staff, n);
            if children.is_empty() {
                return out.empty("note", &attrs);
            }
            out.start("note", &attrs)?;
            for (name, attrs) in &children {
                out.empty(name, attrs)?;
            }
            out.end("note")
        }
        SignKind::Rest(r) => {
            let mut attrs = length_attrs(&r.playable_length);
            attrs.push(("rest-type", r.rest_type.as_ml().to_string()));
            attrs.push(time_start);
            out.empty("rest", &attrs)
        }
    }
}

fn length_attrs(length: &PlayableLength) -> Attrs {
    vec![
        ("playable-length", length.music_length.as_ml().to_string()),
        ("dotted", length.dotted.to_string()),
    ]
}

/// Tie and slur elements of a note, in reading order.
fn note_children(staff: &Staff, note: &Note) -> Vec<(&'static str, Attrs)> {
    let mut children = Vec::new();
    if let Some(tie) = note.tie_start {
        children.push(("tie", slur_attrs(staff, tie)));
    }
    for (start, end, start_tag, end_tag) in [
        (note.slur_start, note.slur_end, "slur-start", "slur-end"),
        (
            note.phrasing_slur_start,
            note.phrasing_slur_end,
            "phrasing-slur-start",
            "phrasing-slur-end",
        ),
    ] {
        let start_el = start.map(|id| (start_tag, slur_attrs(staff, id)));
        let end_el = end.map(|_| (end_tag, Attrs::new()));
        // An end closes the most recent open slur: a slur ending on its
        // own start note must be opened first, any other one is closed
        // before the new one opens.
        if start.is_some() && start == end {
            children.extend(start_el);
            children.extend(end_el);
        } else {
            children.extend(end_el);
            children.extend(start_el);
        }
    }
    children
}

fn slur_attrs(staff: &Staff, id: SlurId) -> Attrs {
    match staff.slur(id) {
        Some(slur) => vec![
            ("slur-style", slur.style.as_ml().to_string()),
            ("slur-direction", slur.direction.as_ml().to_string()),
        ],
        None => Attrs::new(),
    }
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

// ─── Output ──────────────────────────────────────────────────────────

/// Indented markup output.
struct Markup {
    writer: Writer<Vec<u8>>,
}

impl Markup {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, element: &str, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Write {
                element: element.to_string(),
                message: e.to_string(),
            })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<(), ExportError> {
        self.event(name, Event::Start(element(name, attrs)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<(), ExportError> {
        self.event(name, Event::Empty(element(name, attrs)))
    }

    fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.event(name, Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), ExportError> {
        self.start(name, &[])?;
        self.event(name, Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String, ExportError> {
        Ok(String::from_utf8(self.writer.into_inner())?)
    }
}

fn element<'a>(name: &'a str, attrs: &'a [(&str, String)]) -> BytesStart<'a> {
    let mut e = BytesStart::new(name);
    for (key, value) in attrs {
        e.push_attribute((*key, value.as_str()));
    }
    e
}
