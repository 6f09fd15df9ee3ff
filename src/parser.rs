//! CanorusML parser — a streaming state machine that builds a [`Document`]
//! from markup events.
//!
//! Elements are handled as they open: containers (sheet, staff, voice) are
//! looked up or created at once, signs are built from their attributes.
//! Staff-wide signs and playables are attached to their voice when their
//! element closes, because only then is the element complete (a note's
//! ties and slurs are child elements).

use chrono::{DateTime, NaiveDateTime};
use log::{debug, trace, warn};

use crate::dedup::attach_shared_sign;
use crate::error::{ErrorKind, ImportError, Position};
use crate::events::{read_events, Attributes, ContentHandler};
use crate::model::*;
use crate::options::ImportOptions;
use crate::repair::repair_document;
use crate::resolver::PendingRefs;

/// Format of the document's date attributes. The fraction is optional.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a CanorusML string into a Document.
pub fn parse_canorusml(xml: &str) -> Result<Document, ImportError> {
    parse_canorusml_with_options(xml, &ImportOptions::default())
}

/// Parse a CanorusML string with explicit import settings.
pub fn parse_canorusml_with_options(
    xml: &str,
    options: &ImportOptions,
) -> Result<Document, ImportError> {
    let mut parser = ParserContext::new(options.clone());
    read_events(xml, &mut parser, options.max_depth)?;
    parser
        .finish()
        .map_err(|kind| ImportError::new(kind, Some(Position::from_offset(xml, xml.len()))))
}

/// Indices of the containers currently open.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    sheet: Option<usize>,
    context: Option<usize>,
    voice: Option<usize>,
}

/// Signs whose element is open but not yet closed.
#[derive(Debug, Default)]
struct PendingSigns {
    clef: Option<Sign>,
    time_signature: Option<Sign>,
    key_signature: Option<Sign>,
    barline: Option<Sign>,
    /// Already stored in the staff so slurs can point at it; appended to
    /// the voice on close.
    note: Option<SignId>,
    rest: Option<Sign>,
    /// Ties waiting for the next note of the same pitch
    ties: Vec<SlurId>,
    /// Open slurs, most recent last
    slurs: Vec<SlurId>,
    phrasing_slurs: Vec<SlurId>,
}

/// Parser state, threaded through every event.
///
/// Feed it events through [`ContentHandler`] (usually via
/// [`read_events`]) and call [`ParserContext::finish`] at the end of
/// input. Any handler error leaves the context unusable; drop it.
#[derive(Debug, Default)]
pub struct ParserContext {
    options: ImportOptions,
    document: Option<Document>,
    version: Option<String>,
    /// Names of the currently open elements
    depth: Vec<String>,
    /// Character data since the last close tag
    text: String,
    cursor: Cursor,
    pending: PendingSigns,
    refs: PendingRefs,
}

impl ParserContext {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Hand out the document built so far. Fails when no `document`
    /// element was read.
    pub fn finish(self) -> Result<Document, ErrorKind> {
        let mut document = self
            .document
            .ok_or_else(|| precondition("the input contains no <document> element".into()))?;
        if self.version.is_some() {
            document.canorus_version = self.version;
        }
        Ok(document)
    }

    // ─── Containers ──────────────────────────────────────────────────

    fn open_document(&mut self, attrs: &Attributes) -> Result<(), ErrorKind> {
        if self.document.is_some() {
            return Err(precondition(
                "the input contains more than one <document> element".into(),
            ));
        }
        let text = |key: &str| attrs.value(key).to_string();
        self.document = Some(Document {
            title: text("title"),
            subtitle: text("subtitle"),
            composer: text("composer"),
            arranger: text("arranger"),
            poet: text("poet"),
            text_translator: text("text-translator"),
            copyright: text("copyright"),
            dedication: text("dedication"),
            comments: text("comments"),
            date_created: parse_date(attrs, "date-created"),
            date_last_modified: parse_date(attrs, "date-last-modified"),
            time_edited: attrs
                .non_empty("time-edited")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            canorus_version: None,
            sheets: Vec::new(),
        });
        Ok(())
    }

    fn close_document(&mut self) {
        let Some(document) = self.document.as_mut() else {
            return;
        };
        if self.options.repair_voices {
            repair_document(document);
        }
        for sheet in &mut document.sheets {
            for staff in sheet.contexts.iter_mut().filter_map(Context::as_staff_mut) {
                staff.renumber();
            }
        }
        debug!(
            "read document '{}': {} sheet(s), {} staff(s)",
            document.title,
            document.sheets.len(),
            document.staff_count()
        );
    }

    fn open_sheet(&mut self, attrs: &Attributes) -> Result<(), ErrorKind> {
        let name = attrs.value("name");
        if self.cursor.sheet.is_some() {
            return Err(precondition(format!(
                "<sheet> '{name}' is nested inside another <sheet>"
            )));
        }
        let document = self.document.as_mut().ok_or_else(|| {
            precondition(format!("<sheet> '{name}' appears outside of a <document>"))
        })?;

        let idx = match document.sheet_index(name) {
            Some(i) => i,
            None => {
                let name = if name.is_empty() {
                    unique_name("Sheet", document.sheets.len() + 1, |n| {
                        document.sheet(n).is_some()
                    })
                } else {
                    name.to_string()
                };
                document.sheets.push(Sheet::new(name));
                document.sheets.len() - 1
            }
        };
        self.cursor.sheet = Some(idx);
        Ok(())
    }

    fn close_sheet(&mut self) -> Result<(), ErrorKind> {
        if let Some(sheet) = sheet_at(&mut self.document, self.cursor) {
            self.refs.resolve(sheet)?;
        }
        self.cursor.sheet = None;
        Ok(())
    }

    /// `staff`, `lyrics-context` and `function-marking-context`.
    fn open_context(&mut self, element: &str, attrs: &Attributes) -> Result<(), ErrorKind> {
        let (context_type, prefix) = match element {
            "staff" => (ContextType::Staff, "Staff"),
            "lyrics-context" => (ContextType::Lyrics, "Lyrics Context "),
            _ => (ContextType::FunctionMarking, "Function Marking Context "),
        };
        let name = attrs.value("name");
        let sheet = sheet_at(&mut self.document, self.cursor).ok_or_else(|| {
            precondition(format!("<{element}> '{name}' has no enclosing sheet"))
        })?;

        let (idx, created) = match sheet.context_index(name) {
            Some(i) => {
                let found = sheet.contexts[i].context_type();
                if found != context_type {
                    return Err(precondition(format!(
                        "<{element}> '{name}' names an existing {found}"
                    )));
                }
                (i, false)
            }
            None => {
                let first = match context_type {
                    ContextType::Staff => sheet.staff_count() + 1,
                    _ => sheet.contexts.len() + 1,
                };
                let name = if name.is_empty() {
                    unique_name(prefix, first, |n| sheet.context(n).is_some())
                } else {
                    name.to_string()
                };
                let kind = match context_type {
                    ContextType::Staff => {
                        let lines = match attrs.non_empty("number-of-lines") {
                            Some(_) => attrs.int("number-of-lines"),
                            // Absent means an ordinary five-line staff; an explicit 0 is kept.
                            None => 5,
                        };
                        ContextKind::Staff(Staff::new(lines))
                    }
                    ContextType::Lyrics => {
                        ContextKind::Lyrics(LyricsContext::new(attrs.int("stanza-number")))
                    }
                    _ => ContextKind::FunctionMarking(FunctionMarkingContext::default()),
                };
                sheet.contexts.push(Context::new(name, kind));
                (sheet.contexts.len() - 1, true)
            }
        };

        // The associated voice may not have been read yet.
        if created
            && context_type == ContextType::Lyrics
            && attrs.non_empty("associated-voice-idx").is_some()
        {
            self.refs
                .defer_lyrics(idx, attrs.int("associated-voice-idx"));
        }
        self.cursor.context = Some(idx);
        Ok(())
    }

    fn open_voice(&mut self, attrs: &Attributes) -> Result<(), ErrorKind> {
        let name = attrs.value("name");
        let context = context_at(&mut self.document, self.cursor).ok_or_else(|| {
            precondition(format!("voice '{name}' has no enclosing staff"))
        })?;
        let context_type = context.context_type();
        let context_name = context.name.clone();
        let staff = context.as_staff_mut().ok_or_else(|| {
            precondition(format!(
                "voice '{name}' is inside {context_type} '{context_name}', which is not a staff"
            ))
        })?;

        let idx = match staff.voice_index(name) {
            Some(i) => i,
            None => {
                let number = staff.voices.len() + 1;
                let name = if name.is_empty() {
                    unique_name("Voice", number, |n| staff.voice(n).is_some())
                } else {
                    name.to_string()
                };
                let stem = ml_value(attrs, "stem-direction", StemDirection::from_ml);
                staff.voices.push(Voice::new(name, number, stem));
                staff.voices.len() - 1
            }
        };
        self.cursor.voice = Some(idx);
        Ok(())
    }

    fn close_voice(&mut self) -> Result<(), ErrorKind> {
        let mut open = Vec::new();
        if !self.pending.ties.is_empty() {
            open.push("tie");
        }
        if !self.pending.slurs.is_empty() {
            open.push("slur");
        }
        if !self.pending.phrasing_slurs.is_empty() {
            open.push("phrasing slur");
        }
        if !open.is_empty() {
            let name = staff_at(&mut self.document, self.cursor)
                .zip(self.cursor.voice)
                .and_then(|(staff, v)| staff.voices.get(v))
                .map(|v| v.name.clone())
                .unwrap_or_default();
            return Err(ErrorKind::MalformedSlurPairing(format!(
                "voice '{name}' ends with an unterminated {}",
                open.join(" and ")
            )));
        }
        self.cursor.voice = None;
        Ok(())
    }

    // ─── Signs ───────────────────────────────────────────────────────

    fn require_voice(&self, element: &str) -> Result<usize, ErrorKind> {
        self.cursor
            .voice
            .ok_or_else(|| precondition(format!("<{element}> has no enclosing voice")))
    }

    /// Attach a closed clef, key/time signature or barline to the current
    /// voice through the staff's shared signs.
    fn close_shared(&mut self, element: &str, sign: Option<Sign>) -> Result<(), ErrorKind> {
        let Some(sign) = sign else {
            return Ok(());
        };
        let voice = self.require_voice(element)?;
        let staff = staff_at(&mut self.document, self.cursor)
            .ok_or_else(|| precondition(format!("<{element}> is not inside a staff")))?;
        attach_shared_sign(staff, voice, sign)
            .ok_or_else(|| precondition(format!("<{element}> refers to a missing voice")))?;
        Ok(())
    }

    fn open_note(&mut self, attrs: &Attributes) -> Result<(), ErrorKind> {
        self.require_voice("note")?;
        if self.pending.note.is_some() {
            return Err(precondition("<note> is nested inside another <note>".into()));
        }
        let staff = staff_at(&mut self.document, self.cursor)
            .ok_or_else(|| precondition("<note> is not inside a staff".into()))?;

        let mut note = Note::new(
            playable_length(attrs),
            attrs.int("pitch"),
            small_int(attrs, "accs"),
        );
        if attrs.non_empty("stem-direction").is_some() {
            note.stem_direction = ml_value(attrs, "stem-direction", StemDirection::from_ml);
        }
        let id = staff.push_sign(Sign::new(attrs.int("time-start"), SignKind::Note(note)));
        self.pending.note = Some(id);
        Ok(())
    }

    fn close_note(&mut self) -> Result<(), ErrorKind> {
        let Some(id) = self.pending.note.take() else {
            return Ok(());
        };
        let voice = self.require_voice("note")?;
        let staff = staff_at(&mut self.document, self.cursor)
            .ok_or_else(|| precondition("<note> is not inside a staff".into()))?;
        staff
            .voices
            .get_mut(voice)
            .ok_or_else(|| precondition("<note> refers to a missing voice".into()))?
            .signs
            .push(id);
        connect_ties(staff, &mut self.pending.ties, id);
        Ok(())
    }

    fn close_rest(&mut self) -> Result<(), ErrorKind> {
        let Some(rest) = self.pending.rest.take() else {
            return Ok(());
        };
        let voice = self.require_voice("rest")?;
        let staff = staff_at(&mut self.document, self.cursor)
            .ok_or_else(|| precondition("<rest> is not inside a staff".into()))?;
        let id = staff.push_sign(rest);
        staff
            .voices
            .get_mut(voice)
            .ok_or_else(|| precondition("<rest> refers to a missing voice".into()))?
            .signs
            .push(id);
        Ok(())
    }

    /// `tie`, `slur-start` and `phrasing-slur-start`: a new slur starting
    /// at the open note.
    fn open_slur(
        &mut self,
        element: &str,
        kind: SlurKind,
        attrs: &Attributes,
    ) -> Result<(), ErrorKind> {
        let note = self
            .pending
            .note
            .ok_or_else(|| precondition(format!("<{element}> appears outside of a <note>")))?;
        let staff = staff_at(&mut self.document, self.cursor)
            .ok_or_else(|| precondition(format!("<{element}> is not inside a staff")))?;

        let id = staff.push_slur(Slur {
            kind,
            style: ml_value(attrs, "slur-style", SlurStyle::from_ml),
            direction: ml_value(attrs, "slur-direction", SlurDirection::from_ml),
            note_start: note,
            note_end: None,
        });
        if let Some(n) = staff.note_mut(note) {
            match kind {
                SlurKind::Tie => n.tie_start = Some(id),
                SlurKind::Slur => n.slur_start = Some(id),
                SlurKind::PhrasingSlur => n.phrasing_slur_start = Some(id),
            }
        }
        self.open_slurs(kind).push(id);
        Ok(())
    }

    /// `slur-end` and `phrasing-slur-end`: end the most recently opened
    /// slur of that kind at the open note.
    fn end_slur(&mut self, element: &str, kind: SlurKind) -> Result<(), ErrorKind> {
        let note = self
            .pending
            .note
            .ok_or_else(|| precondition(format!("<{element}> appears outside of a <note>")))?;
        let id = self.open_slurs(kind).pop().ok_or_else(|| {
            ErrorKind::MalformedSlurPairing(format!(
                "<{element}> has no matching {} start",
                kind.as_ml()
            ))
        })?;
        let staff = staff_at(&mut self.document, self.cursor)
            .ok_or_else(|| precondition(format!("<{element}> is not inside a staff")))?;

        if let Some(slur) = staff.slur_mut(id) {
            slur.note_end = Some(note);
        }
        if let Some(n) = staff.note_mut(note) {
            match kind {
                SlurKind::Tie => n.tie_end = Some(id),
                SlurKind::Slur => n.slur_end = Some(id),
                SlurKind::PhrasingSlur => n.phrasing_slur_end = Some(id),
            }
        }
        Ok(())
    }

    fn open_slurs(&mut self, kind: SlurKind) -> &mut Vec<SlurId> {
        match kind {
            SlurKind::Tie => &mut self.pending.ties,
            SlurKind::Slur => &mut self.pending.slurs,
            SlurKind::PhrasingSlur => &mut self.pending.phrasing_slurs,
        }
    }

    // ─── Lyrics and function markings ────────────────────────────────

    fn open_syllable(&mut self, attrs: &Attributes) -> Result<(), ErrorKind> {
        let context = context_at(&mut self.document, self.cursor)
            .ok_or_else(|| precondition("<syllable> has no enclosing lyrics context".into()))?;
        let context_type = context.context_type();
        let context_name = context.name.clone();
        let lyrics = context.as_lyrics_mut().ok_or_else(|| {
            precondition(format!(
                "<syllable> is inside {context_type} '{context_name}', which is not a lyrics context"
            ))
        })?;

        let idx = lyrics.add_syllable(Syllable {
            text: attrs.value("text").to_string(),
            hyphen: attrs.flag("hyphen"),
            melisma: attrs.flag("melisma"),
            time_start: attrs.int("time-start"),
            time_length: attrs.int("time-length"),
            associated_voice: None,
        });
        if attrs.non_empty("associated-voice-idx").is_some() {
            if let Some(ctx) = self.cursor.context {
                self.refs
                    .defer_syllable(ctx, idx, attrs.int("associated-voice-idx"));
            }
        }
        Ok(())
    }

    fn open_function_marking(&mut self, attrs: &Attributes) -> Result<(), ErrorKind> {
        let context = context_at(&mut self.document, self.cursor).ok_or_else(|| {
            precondition("<function-marking> has no enclosing function marking context".into())
        })?;
        let context_type = context.context_type();
        let context_name = context.name.clone();
        let markings = context.as_function_marking_mut().ok_or_else(|| {
            precondition(format!(
                "<function-marking> is inside {context_type} '{context_name}', which is not a function marking context"
            ))
        })?;

        markings.add_function_marking(FunctionMarking {
            function: ml_value(attrs, "function", FunctionType::from_ml),
            minor: attrs.flag("minor"),
            key: attrs.non_empty("key").unwrap_or("C").to_string(),
            time_start: attrs.int("time-start"),
            time_length: attrs.int("time-length"),
            chord_area: ml_value(attrs, "chord-area", FunctionType::from_ml),
            chord_area_minor: attrs.flag("chord-area-minor"),
            tonic_degree: ml_value(attrs, "tonic-degree", FunctionType::from_ml),
            tonic_degree_minor: attrs.flag("tonic-degree-minor"),
            ellipse: attrs.flag("ellipse"),
        });
        Ok(())
    }
}

impl ContentHandler for ParserContext {
    fn start_element(&mut self, name: &str, attrs: &Attributes) -> Result<(), ErrorKind> {
        match name {
            "document" => self.open_document(attrs)?,
            "sheet" => self.open_sheet(attrs)?,
            "staff" | "lyrics-context" | "function-marking-context" => {
                self.open_context(name, attrs)?
            }
            "voice" => self.open_voice(attrs)?,
            "clef" => {
                self.require_voice(name)?;
                self.pending.clef = Some(read_clef(attrs));
            }
            "time-signature" => {
                self.require_voice(name)?;
                self.pending.time_signature = Some(read_time_signature(attrs));
            }
            "key-signature" => {
                self.require_voice(name)?;
                self.pending.key_signature = Some(read_key_signature(attrs));
            }
            "barline" => {
                self.require_voice(name)?;
                self.pending.barline = Some(read_barline(attrs));
            }
            "note" => self.open_note(attrs)?,
            "tie" => self.open_slur(name, SlurKind::Tie, attrs)?,
            "slur-start" => self.open_slur(name, SlurKind::Slur, attrs)?,
            "phrasing-slur-start" => self.open_slur(name, SlurKind::PhrasingSlur, attrs)?,
            "slur-end" => self.end_slur(name, SlurKind::Slur)?,
            "phrasing-slur-end" => self.end_slur(name, SlurKind::PhrasingSlur)?,
            "rest" => {
                self.require_voice(name)?;
                self.pending.rest = Some(read_rest(attrs));
            }
            "syllable" => self.open_syllable(attrs)?,
            "function-marking" => self.open_function_marking(attrs)?,
            _ => trace!(
                "ignoring <{name}> inside <{}>",
                self.depth.last().map_or("", String::as_str)
            ),
        }
        self.depth.push(name.to_string());
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), ErrorKind> {
        match name {
            "canorus-version" => self.version = Some(self.text.trim().to_string()),
            "document" => self.close_document(),
            "sheet" => self.close_sheet()?,
            "staff" | "lyrics-context" | "function-marking-context" => {
                self.cursor.context = None
            }
            "voice" => self.close_voice()?,
            "clef" => {
                let sign = self.pending.clef.take();
                self.close_shared(name, sign)?
            }
            "time-signature" => {
                let sign = self.pending.time_signature.take();
                self.close_shared(name, sign)?
            }
            "key-signature" => {
                let sign = self.pending.key_signature.take();
                self.close_shared(name, sign)?
            }
            "barline" => {
                let sign = self.pending.barline.take();
                self.close_shared(name, sign)?
            }
            "note" => self.close_note()?,
            "rest" => self.close_rest()?,
            _ => {}
        }
        self.text.clear();
        self.depth.pop();
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ErrorKind> {
        self.text.push_str(text);
        Ok(())
    }
}

// ─── Sign builders ───────────────────────────────────────────────────

fn read_clef(attrs: &Attributes) -> Sign {
    Sign::new(
        attrs.int("time-start"),
        SignKind::Clef(Clef {
            clef_type: ml_value(attrs, "clef-type", ClefType::from_ml),
            c1: attrs.int("c1"),
            offset: attrs.int("offset"),
        }),
    )
}

fn read_time_signature(attrs: &Attributes) -> Sign {
    Sign::new(
        attrs.int("time-start"),
        SignKind::TimeSignature(TimeSignature {
            beats: attrs.int("beats"),
            beat: attrs.int("beat"),
            time_signature_type: ml_value(
                attrs,
                "time-signature-type",
                TimeSignatureType::from_ml,
            ),
        }),
    )
}

fn read_key_signature(attrs: &Attributes) -> Sign {
    let key_signature_type = ml_value(attrs, "key-signature-type", KeySignatureType::from_ml);
    // The modus only means something for modal keys.
    let modus = match key_signature_type {
        KeySignatureType::Modus => ml_value(attrs, "modus", Modus::from_ml),
        _ => Modus::default(),
    };
    Sign::new(
        attrs.int("time-start"),
        SignKind::KeySignature(KeySignature {
            key_signature_type,
            accs: small_int(attrs, "accs"),
            gender: ml_value(attrs, "major-minor-gender", MajorMinorGender::from_ml),
            modus,
        }),
    )
}

fn read_barline(attrs: &Attributes) -> Sign {
    Sign::new(
        attrs.int("time-start"),
        SignKind::Barline(Barline {
            barline_type: ml_value(attrs, "barline-type", BarlineType::from_ml),
        }),
    )
}

fn read_rest(attrs: &Attributes) -> Sign {
    Sign::new(
        attrs.int("time-start"),
        SignKind::Rest(Rest {
            rest_type: ml_value(attrs, "rest-type", RestType::from_ml),
            playable_length: playable_length(attrs),
        }),
    )
}

fn playable_length(attrs: &Attributes) -> PlayableLength {
    let music_length = match attrs.non_empty("playable-length") {
        None => MusicLength::default(),
        Some(v) => MusicLength::from_ml(v)
            .or_else(|| v.trim().parse().ok().and_then(MusicLength::from_number))
            .unwrap_or_else(|| {
                warn!("unknown playable-length \"{v}\", using quarter");
                MusicLength::default()
            }),
    };
    PlayableLength {
        music_length,
        dotted: u8::try_from(attrs.int("dotted")).unwrap_or(0),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn precondition(message: String) -> ErrorKind {
    ErrorKind::StructuralPrecondition(message)
}

/// Enumerated attribute value; absent → default, unknown → default
/// (logged).
fn ml_value<T: Default>(attrs: &Attributes, key: &str, from_ml: fn(&str) -> Option<T>) -> T {
    match attrs.non_empty(key) {
        None => T::default(),
        Some(v) => from_ml(v).unwrap_or_else(|| {
            warn!("unknown {key} \"{v}\", using the default");
            T::default()
        }),
    }
}

/// Accidental counts fit in an i8; anything else reads as 0.
fn small_int(attrs: &Attributes, key: &str) -> i8 {
    let v = attrs.int(key);
    i8::try_from(v).unwrap_or_else(|_| {
        warn!("{key}={v} is out of range, using 0");
        0
    })
}

fn parse_date(attrs: &Attributes, key: &str) -> Option<NaiveDateTime> {
    let value = attrs.non_empty(key)?;
    let parsed = NaiveDateTime::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|d| d.naive_utc()));
    match parsed {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("{key}=\"{value}\" is not an ISO date: {e}");
            None
        }
    }
}

/// `<prefix><n>` with the smallest `n >= first` not yet taken.
fn unique_name(prefix: &str, first: usize, taken: impl Fn(&str) -> bool) -> String {
    let mut n = first;
    loop {
        let name = format!("{prefix}{n}");
        if !taken(&name) {
            return name;
        }
        n += 1;
    }
}

/// End a pending tie at `note`: the tie must start on an earlier note of
/// the same pitch.
fn connect_ties(staff: &mut Staff, open: &mut Vec<SlurId>, note: SignId) {
    let Some(sign) = staff.sign(note) else {
        return;
    };
    let Some(pitch) = sign.as_note().map(|n| n.pitch) else {
        return;
    };
    let time = sign.time_start;

    let pos = open.iter().position(|&tie| {
        staff
            .slur(tie)
            .and_then(|t| staff.sign(t.note_start))
            .is_some_and(|start| {
                start.time_start < time && start.as_note().is_some_and(|n| n.pitch == pitch)
            })
    });
    if let Some(pos) = pos {
        let tie = open.remove(pos);
        if let Some(t) = staff.slur_mut(tie) {
            t.note_end = Some(note);
        }
        if let Some(n) = staff.note_mut(note) {
            n.tie_end = Some(tie);
        }
    }
}

fn sheet_at(document: &mut Option<Document>, cursor: Cursor) -> Option<&mut Sheet> {
    document.as_mut()?.sheets.get_mut(cursor.sheet?)
}

fn context_at(document: &mut Option<Document>, cursor: Cursor) -> Option<&mut Context> {
    let ctx = cursor.context?;
    sheet_at(document, cursor)?.contexts.get_mut(ctx)
}

fn staff_at(document: &mut Option<Document>, cursor: Cursor) -> Option<&mut Staff> {
    context_at(document, cursor)?.as_staff_mut()
}
