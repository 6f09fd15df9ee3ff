//! Data model for a CanorusML document.
//!
//! A document owns its sheets, a sheet owns its contexts and a staff owns
//! every sign placed on it. Voices never own signs: they hold [`SignId`]
//! handles into the staff's sign arena, so a clef that applies to all
//! voices of a staff exists exactly once.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Declares an enumeration whose values have fixed CanorusML names.
macro_rules! ml_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($(#[$vmeta:meta])* $variant:ident => $ml:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Name of this value in CanorusML attributes.
            pub fn as_ml(self) -> &'static str {
                match self {
                    $(Self::$variant => $ml),+
                }
            }

            /// Look up a value by its CanorusML name.
            pub fn from_ml(s: &str) -> Option<Self> {
                match s {
                    $($ml => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

// ─── Document ────────────────────────────────────────────────────────

/// A complete score read from CanorusML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub subtitle: String,
    pub composer: String,
    pub arranger: String,
    pub poet: String,
    pub text_translator: String,
    pub copyright: String,
    pub dedication: String,
    pub comments: String,
    pub date_created: Option<NaiveDateTime>,
    pub date_last_modified: Option<NaiveDateTime>,
    /// Total editing time in seconds
    pub time_edited: u32,
    /// Version of Canorus which saved the file
    pub canorus_version: Option<String>,
    pub sheets: Vec<Sheet>,
}

impl Document {
    /// Find a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name == name)
    }

    /// Number of staffs across all sheets.
    pub fn staff_count(&self) -> usize {
        self.sheets.iter().map(Sheet::staff_count).sum()
    }
}

// ─── Sheet ───────────────────────────────────────────────────────────

/// A sheet: an ordered set of contexts (staffs, lyrics, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub contexts: Vec<Context>,
}

/// Position of a voice within a sheet: the staff's context index and the
/// voice index inside that staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceRef {
    pub context: usize,
    pub voice: usize,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contexts: Vec::new(),
        }
    }

    /// Find a context by name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn context_index(&self, name: &str) -> Option<usize> {
        self.contexts.iter().position(|c| c.name == name)
    }

    pub fn staff_count(&self) -> usize {
        self.staffs().count()
    }

    /// Iterate over all staffs in context order.
    pub fn staffs(&self) -> impl Iterator<Item = &Staff> {
        self.contexts.iter().filter_map(Context::as_staff)
    }

    /// Find a staff by name.
    pub fn staff(&self, name: &str) -> Option<&Staff> {
        self.context(name).and_then(Context::as_staff)
    }

    pub fn lyrics_context(&self, name: &str) -> Option<&LyricsContext> {
        self.context(name).and_then(Context::as_lyrics)
    }

    pub fn function_marking_context(&self, name: &str) -> Option<&FunctionMarkingContext> {
        self.context(name).and_then(Context::as_function_marking)
    }

    /// All voices of the sheet: staffs in context order, voices in staff
    /// order. Voice indices in CanorusML refer to positions in this list.
    pub fn voice_list(&self) -> Vec<VoiceRef> {
        self.contexts
            .iter()
            .enumerate()
            .filter_map(|(ci, c)| c.as_staff().map(|s| (ci, s)))
            .flat_map(|(ci, staff)| {
                (0..staff.voices.len()).map(move |vi| VoiceRef {
                    context: ci,
                    voice: vi,
                })
            })
            .collect()
    }

    /// Resolve a voice reference.
    pub fn voice(&self, r: VoiceRef) -> Option<&Voice> {
        self.contexts
            .get(r.context)
            .and_then(Context::as_staff)
            .and_then(|s| s.voices.get(r.voice))
    }
}

// ─── Contexts ────────────────────────────────────────────────────────

/// A named, track-like container within a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub kind: ContextKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContextKind {
    Staff(Staff),
    Lyrics(LyricsContext),
    FunctionMarking(FunctionMarkingContext),
    Tablature,
    Dynamics,
}

/// Variant tag of a [`Context`], used for diagnostics and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    Staff,
    Lyrics,
    FunctionMarking,
    Tablature,
    Dynamics,
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContextType::Staff => "staff",
            ContextType::Lyrics => "lyrics context",
            ContextType::FunctionMarking => "function marking context",
            ContextType::Tablature => "tablature",
            ContextType::Dynamics => "dynamics context",
        })
    }
}

impl Context {
    pub fn new(name: impl Into<String>, kind: ContextKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn context_type(&self) -> ContextType {
        match self.kind {
            ContextKind::Staff(_) => ContextType::Staff,
            ContextKind::Lyrics(_) => ContextType::Lyrics,
            ContextKind::FunctionMarking(_) => ContextType::FunctionMarking,
            ContextKind::Tablature => ContextType::Tablature,
            ContextKind::Dynamics => ContextType::Dynamics,
        }
    }

    pub fn as_staff(&self) -> Option<&Staff> {
        match &self.kind {
            ContextKind::Staff(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_staff_mut(&mut self) -> Option<&mut Staff> {
        match &mut self.kind {
            ContextKind::Staff(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_lyrics(&self) -> Option<&LyricsContext> {
        match &self.kind {
            ContextKind::Lyrics(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_lyrics_mut(&mut self) -> Option<&mut LyricsContext> {
        match &mut self.kind {
            ContextKind::Lyrics(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_function_marking(&self) -> Option<&FunctionMarkingContext> {
        match &self.kind {
            ContextKind::FunctionMarking(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_function_marking_mut(&mut self) -> Option<&mut FunctionMarkingContext> {
        match &mut self.kind {
            ContextKind::FunctionMarking(f) => Some(f),
            _ => None,
        }
    }
}

/// Handle of a sign in its staff's sign arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignId(pub usize);

/// Handle of a slur or tie in its staff's slur arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlurId(pub usize);

/// A staff with its voices.
///
/// The staff owns every sign placed on it. `shared` lists the canonical
/// clefs, key/time signatures and barlines ordered by time-start; each
/// voice references the ones that apply to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub number_of_lines: i32,
    pub voices: Vec<Voice>,
    signs: Vec<Sign>,
    shared: Vec<SignId>,
    slurs: Vec<Slur>,
}

impl Staff {
    pub fn new(number_of_lines: i32) -> Self {
        Self {
            number_of_lines,
            ..Self::default()
        }
    }

    /// Find a voice by name.
    pub fn voice(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.name == name)
    }

    pub fn voice_index(&self, name: &str) -> Option<usize> {
        self.voices.iter().position(|v| v.name == name)
    }

    pub fn sign(&self, id: SignId) -> Option<&Sign> {
        self.signs.get(id.0)
    }

    /// Every sign owned by the staff, in storage order.
    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    pub fn note(&self, id: SignId) -> Option<&Note> {
        self.sign(id).and_then(Sign::as_note)
    }

    /// Canonical staff-wide signs ordered by time-start.
    pub fn shared_sign_ids(&self) -> &[SignId] {
        &self.shared
    }

    pub fn shared_signs(&self) -> impl Iterator<Item = (SignId, &Sign)> {
        self.shared
            .iter()
            .filter_map(move |&id| self.sign(id).map(|s| (id, s)))
    }

    pub fn slur(&self, id: SlurId) -> Option<&Slur> {
        self.slurs.get(id.0)
    }

    pub fn slurs(&self) -> &[Slur] {
        &self.slurs
    }

    /// Signs of `voice` in voice order.
    pub fn voice_signs<'a>(&'a self, voice: &'a Voice) -> impl Iterator<Item = &'a Sign> + 'a {
        voice.signs.iter().filter_map(move |&id| self.sign(id))
    }

    pub(crate) fn push_sign(&mut self, sign: Sign) -> SignId {
        self.signs.push(sign);
        SignId(self.signs.len() - 1)
    }

    pub(crate) fn sign_mut(&mut self, id: SignId) -> Option<&mut Sign> {
        self.signs.get_mut(id.0)
    }

    pub(crate) fn note_mut(&mut self, id: SignId) -> Option<&mut Note> {
        self.sign_mut(id).and_then(|s| match &mut s.kind {
            SignKind::Note(n) => Some(n),
            _ => None,
        })
    }

    /// Insert `id` into the canonical list after every sign starting at
    /// or before it.
    pub(crate) fn insert_shared(&mut self, id: SignId) {
        let time = match self.sign(id) {
            Some(s) => s.time_start,
            None => return,
        };
        let signs = &self.signs;
        let pos = self
            .shared
            .partition_point(|other| signs[other.0].time_start <= time);
        self.shared.insert(pos, id);
    }

    pub(crate) fn push_slur(&mut self, slur: Slur) -> SlurId {
        self.slurs.push(slur);
        SlurId(self.slurs.len() - 1)
    }

    pub(crate) fn slur_mut(&mut self, id: SlurId) -> Option<&mut Slur> {
        self.slurs.get_mut(id.0)
    }

    /// Renumber both arenas in order of first use and drop unreferenced
    /// entries. Signs are numbered walking the voices in order, slurs by
    /// the note that starts them; the shared list is reordered by
    /// time-start, then by the new handles.
    ///
    /// Two staffs with the same voice contents compare equal after this,
    /// however their signs were read.
    pub fn renumber(&mut self) {
        let mut sign_map: Vec<Option<usize>> = vec![None; self.signs.len()];
        let mut sign_order = Vec::new();
        for voice in &self.voices {
            for id in &voice.signs {
                match sign_map.get_mut(id.0) {
                    Some(slot) if slot.is_none() => {
                        *slot = Some(sign_order.len());
                        sign_order.push(id.0);
                    }
                    _ => {}
                }
            }
        }

        let mut slur_map: Vec<Option<usize>> = vec![None; self.slurs.len()];
        let mut slur_order = Vec::new();
        for &old in &sign_order {
            let Some(note) = self.signs.get(old).and_then(Sign::as_note) else {
                continue;
            };
            for id in [note.tie_start, note.slur_start, note.phrasing_slur_start]
                .into_iter()
                .flatten()
            {
                match slur_map.get_mut(id.0) {
                    Some(slot) if slot.is_none() => {
                        *slot = Some(slur_order.len());
                        slur_order.push(id.0);
                    }
                    _ => {}
                }
            }
        }

        let sign_id = |id: SignId| sign_map.get(id.0).copied().flatten().map(SignId);
        let slur_id = |id: SlurId| slur_map.get(id.0).copied().flatten().map(SlurId);

        let mut old_signs: Vec<Option<Sign>> =
            std::mem::take(&mut self.signs).into_iter().map(Some).collect();
        self.signs = sign_order
            .iter()
            .filter_map(|&i| old_signs.get_mut(i).and_then(Option::take))
            .collect();
        for sign in &mut self.signs {
            if let SignKind::Note(n) = &mut sign.kind {
                for field in [
                    &mut n.tie_start,
                    &mut n.tie_end,
                    &mut n.slur_start,
                    &mut n.slur_end,
                    &mut n.phrasing_slur_start,
                    &mut n.phrasing_slur_end,
                ] {
                    *field = field.and_then(slur_id);
                }
            }
        }

        let old_slurs = std::mem::take(&mut self.slurs);
        self.slurs = slur_order
            .iter()
            .filter_map(|&i| old_slurs.get(i).copied())
            .filter_map(|slur| {
                Some(Slur {
                    note_start: sign_id(slur.note_start)?,
                    note_end: slur.note_end.and_then(sign_id),
                    ..slur
                })
            })
            .collect();

        for voice in &mut self.voices {
            voice.signs = voice.signs.iter().filter_map(|&id| sign_id(id)).collect();
        }

        self.shared = self.shared.iter().filter_map(|&id| sign_id(id)).collect();
        let signs = &self.signs;
        self.shared
            .sort_by_key(|id| (signs.get(id.0).map_or(i32::MAX, |s| s.time_start), id.0));
    }
}

/// A lyrics line (stanza) attached to a voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsContext {
    pub stanza_number: i32,
    pub associated_voice: Option<VoiceRef>,
    pub syllables: Vec<Syllable>,
}

impl LyricsContext {
    pub fn new(stanza_number: i32) -> Self {
        Self {
            stanza_number,
            ..Self::default()
        }
    }

    /// Append a syllable and return its index. Indices stay stable, so
    /// pending voice references can address syllables by position.
    pub fn add_syllable(&mut self, syllable: Syllable) -> usize {
        self.syllables.push(syllable);
        self.syllables.len() - 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionMarkingContext {
    pub markings: Vec<FunctionMarking>,
}

impl FunctionMarkingContext {
    /// Add a marking keeping the list ordered by time-start.
    pub fn add_function_marking(&mut self, marking: FunctionMarking) {
        let pos = self
            .markings
            .partition_point(|m| m.time_start <= marking.time_start);
        self.markings.insert(pos, marking);
    }
}

// ─── Voice ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// 1-based position within the staff
    pub number: usize,
    pub stem_direction: StemDirection,
    /// Handles into the owning staff's sign arena, in time order
    pub signs: Vec<SignId>,
}

impl Voice {
    pub fn new(name: impl Into<String>, number: usize, stem_direction: StemDirection) -> Self {
        Self {
            name: name.into(),
            number,
            stem_direction,
            signs: Vec::new(),
        }
    }

    pub fn contains(&self, id: SignId) -> bool {
        self.signs.contains(&id)
    }
}

// ─── Signs ───────────────────────────────────────────────────────────

/// A time-stamped musical element placed on a staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sign {
    pub time_start: i32,
    pub time_length: i32,
    pub kind: SignKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignKind {
    Clef(Clef),
    KeySignature(KeySignature),
    TimeSignature(TimeSignature),
    Barline(Barline),
    Note(Note),
    Rest(Rest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignType {
    Clef,
    KeySignature,
    TimeSignature,
    Barline,
    Note,
    Rest,
}

impl Sign {
    pub fn new(time_start: i32, kind: SignKind) -> Self {
        let time_length = match &kind {
            SignKind::Note(n) => n.playable_length.time_length(),
            SignKind::Rest(r) => r.playable_length.time_length(),
            _ => 0,
        };
        Self {
            time_start,
            time_length,
            kind,
        }
    }

    pub fn sign_type(&self) -> SignType {
        match self.kind {
            SignKind::Clef(_) => SignType::Clef,
            SignKind::KeySignature(_) => SignType::KeySignature,
            SignKind::TimeSignature(_) => SignType::TimeSignature,
            SignKind::Barline(_) => SignType::Barline,
            SignKind::Note(_) => SignType::Note,
            SignKind::Rest(_) => SignType::Rest,
        }
    }

    pub fn is_playable(&self) -> bool {
        matches!(self.kind, SignKind::Note(_) | SignKind::Rest(_))
    }

    pub fn as_note(&self) -> Option<&Note> {
        match &self.kind {
            SignKind::Note(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clef {
    pub clef_type: ClefType,
    /// Staff position of middle C
    pub c1: i32,
    pub offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    pub key_signature_type: KeySignatureType,
    /// Number of sharps (positive) or flats (negative)
    pub accs: i8,
    pub gender: MajorMinorGender,
    pub modus: Modus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: i32,
    pub beat: i32,
    pub time_signature_type: TimeSignatureType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barline {
    pub barline_type: BarlineType,
}

/// Written length of a note or rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayableLength {
    pub music_length: MusicLength,
    pub dotted: u8,
}

impl PlayableLength {
    /// Duration in ticks: a quarter is 256, every dot adds half of the
    /// previously added value.
    pub fn time_length(&self) -> i32 {
        let base = match self.music_length {
            MusicLength::Breve => 2048,
            MusicLength::Whole => 1024,
            MusicLength::Half => 512,
            MusicLength::Quarter => 256,
            MusicLength::Eighth => 128,
            MusicLength::Sixteenth => 64,
            MusicLength::ThirtySecond => 32,
            MusicLength::SixtyFourth => 16,
            MusicLength::HundredTwentyEighth => 8,
        };
        let mut length = base;
        let mut added = base;
        for _ in 0..self.dotted {
            added /= 2;
            length += added;
        }
        length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub playable_length: PlayableLength,
    /// Diatonic pitch; 0 is sub-contra C
    pub pitch: i32,
    /// Accidentals: 1 sharp, -1 flat, ...
    pub accs: i8,
    pub stem_direction: StemDirection,
    pub tie_start: Option<SlurId>,
    pub tie_end: Option<SlurId>,
    pub slur_start: Option<SlurId>,
    pub slur_end: Option<SlurId>,
    pub phrasing_slur_start: Option<SlurId>,
    pub phrasing_slur_end: Option<SlurId>,
}

impl Note {
    pub fn new(playable_length: PlayableLength, pitch: i32, accs: i8) -> Self {
        Self {
            playable_length,
            pitch,
            accs,
            stem_direction: StemDirection::Preferred,
            tie_start: None,
            tie_end: None,
            slur_start: None,
            slur_end: None,
            phrasing_slur_start: None,
            phrasing_slur_end: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rest {
    pub rest_type: RestType,
    pub playable_length: PlayableLength,
}

/// A tie, slur or phrasing slur between two notes of the same staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slur {
    pub kind: SlurKind,
    pub style: SlurStyle,
    pub direction: SlurDirection,
    pub note_start: SignId,
    pub note_end: Option<SignId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Syllable {
    pub text: String,
    pub hyphen: bool,
    pub melisma: bool,
    pub time_start: i32,
    pub time_length: i32,
    pub associated_voice: Option<VoiceRef>,
}

/// A harmonic function mark (T, S, D, ...) below the staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMarking {
    pub function: FunctionType,
    pub minor: bool,
    pub key: String,
    pub time_start: i32,
    pub time_length: i32,
    pub chord_area: FunctionType,
    pub chord_area_minor: bool,
    pub tonic_degree: FunctionType,
    pub tonic_degree_minor: bool,
    pub ellipse: bool,
}

// ─── Enumerations ────────────────────────────────────────────────────

ml_enum! {
    StemDirection default Neutral {
        Neutral => "neutral",
        Up => "up",
        Down => "down",
        /// Follow the voice's preference
        Preferred => "preferred",
    }
}

ml_enum! {
    ClefType default Treble {
        Treble => "treble",
        Bass => "bass",
        Alto => "alto",
        Tenor => "tenor",
        Soprano => "soprano",
        Baritone => "baritone",
        Percussion => "percussion",
        Tablature => "tablature",
    }
}

ml_enum! {
    KeySignatureType default MajorMinor {
        MajorMinor => "major-minor",
        Modus => "modus",
        Custom => "custom",
    }
}

ml_enum! {
    MajorMinorGender default Major {
        Major => "major",
        Minor => "minor",
    }
}

ml_enum! {
    Modus default Ionian {
        Ionian => "ionian",
        Dorian => "dorian",
        Phrygian => "phrygian",
        Lydian => "lydian",
        Mixolydian => "mixolydian",
        Aeolian => "aeolian",
        Locrian => "locrian",
    }
}

ml_enum! {
    TimeSignatureType default Classical {
        Classical => "classical",
        Number => "number",
        Mensural => "mensural",
        Neomensural => "neomensural",
        Baroque => "baroque",
    }
}

ml_enum! {
    BarlineType default Single {
        Single => "single",
        Double => "double",
        End => "end",
        RepeatOpen => "repeat-open",
        RepeatClose => "repeat-close",
        RepeatCloseOpen => "repeat-close-open",
        Dotted => "dotted",
    }
}

ml_enum! {
    MusicLength default Quarter {
        Breve => "breve",
        Whole => "whole",
        Half => "half",
        Quarter => "quarter",
        Eighth => "eighth",
        Sixteenth => "sixteenth",
        ThirtySecond => "thirty-second",
        SixtyFourth => "sixty-fourth",
        HundredTwentyEighth => "hundred-twenty-eighth",
    }
}

impl MusicLength {
    /// Old files store lengths as the note value's denominator
    /// (0 = breve, 1 = whole, 4 = quarter, ...).
    pub fn from_number(n: i32) -> Option<Self> {
        Some(match n {
            0 => Self::Breve,
            1 => Self::Whole,
            2 => Self::Half,
            4 => Self::Quarter,
            8 => Self::Eighth,
            16 => Self::Sixteenth,
            32 => Self::ThirtySecond,
            64 => Self::SixtyFourth,
            128 => Self::HundredTwentyEighth,
            _ => return None,
        })
    }
}

ml_enum! {
    RestType default Normal {
        Normal => "normal",
        Hidden => "hidden",
    }
}

ml_enum! {
    SlurKind default Slur {
        Tie => "tie",
        Slur => "slur",
        PhrasingSlur => "phrasing-slur",
    }
}

ml_enum! {
    SlurStyle default Solid {
        Solid => "solid",
        Dotted => "dotted",
    }
}

ml_enum! {
    SlurDirection default Preferred {
        Preferred => "preferred",
        Neutral => "neutral",
        Up => "up",
        Down => "down",
    }
}

ml_enum! {
    FunctionType default Undefined {
        Undefined => "undefined",
        I => "I",
        II => "II",
        III => "III",
        IV => "IV",
        V => "V",
        VI => "VI",
        VII => "VII",
        T => "T",
        S => "S",
        D => "D",
        F => "F",
        N => "N",
        L => "L",
        K => "K",
    }
}
