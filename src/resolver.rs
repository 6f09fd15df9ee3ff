//! Deferred voice references.
//!
//! Lyrics contexts and syllables name their voice by index into the
//! sheet's voice list, and that voice may not have been read yet. The
//! references are parked here and resolved once, when the sheet closes.

use std::collections::BTreeMap;

use log::debug;

use crate::error::ErrorKind;
use crate::model::{Context, LyricsContext, Sheet, VoiceRef};

/// Pending voice-index references of the sheet being read.
#[derive(Debug, Default)]
pub struct PendingRefs {
    /// lyrics context index → voice index
    lyrics: BTreeMap<usize, i32>,
    /// (lyrics context index, syllable index) → voice index
    syllables: BTreeMap<(usize, usize), i32>,
}

impl PendingRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer_lyrics(&mut self, context: usize, voice_index: i32) {
        self.lyrics.insert(context, voice_index);
    }

    pub fn defer_syllable(&mut self, context: usize, syllable: usize, voice_index: i32) {
        self.syllables.insert((context, syllable), voice_index);
    }

    pub fn len(&self) -> usize {
        self.lyrics.len() + self.syllables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assign every pending reference its voice from `sheet`'s voice list
    /// and empty the table. Returns how many references were resolved.
    ///
    /// A reference whose lyrics context or syllable is not in `sheet`
    /// fails like an out-of-range index. The table is emptied even when a
    /// reference fails, so resolving again is always a no-op.
    pub fn resolve(&mut self, sheet: &mut Sheet) -> Result<usize, ErrorKind> {
        let lyrics = std::mem::take(&mut self.lyrics);
        let syllables = std::mem::take(&mut self.syllables);
        if lyrics.is_empty() && syllables.is_empty() {
            return Ok(0);
        }

        let voices = sheet.voice_list();
        let sheet_name = sheet.name.clone();
        let lookup = |index: i32, referrer: String| -> Result<VoiceRef, ErrorKind> {
            usize::try_from(index)
                .ok()
                .and_then(|i| voices.get(i).copied())
                .ok_or_else(|| ErrorKind::UnresolvedReference {
                    sheet: sheet_name.clone(),
                    referrer,
                    index,
                    voice_count: voices.len(),
                })
        };

        let mut resolved = 0;

        for (ctx, index) in lyrics {
            let name = context_name(sheet, ctx)?;
            let voice = lookup(index, format!("lyrics context '{name}'"))?;
            lyrics_at(sheet, ctx, &name)?.associated_voice = Some(voice);
            resolved += 1;
        }

        for ((ctx, syl), index) in syllables {
            let name = context_name(sheet, ctx)?;
            let syllable = lyrics_at(sheet, ctx, &name)?
                .syllables
                .get_mut(syl)
                .ok_or_else(|| {
                    ErrorKind::StructuralPrecondition(format!(
                        "syllable #{syl} of lyrics context '{name}' is not part of sheet '{sheet_name}'"
                    ))
                })?;
            let voice = lookup(
                index,
                format!("syllable '{}' in lyrics context '{name}'", syllable.text),
            )?;
            syllable.associated_voice = Some(voice);
            resolved += 1;
        }

        debug!(
            "sheet '{}': resolved {resolved} voice reference(s) against {} voice(s)",
            sheet.name,
            voices.len()
        );
        Ok(resolved)
    }
}

fn context_name(sheet: &Sheet, ctx: usize) -> Result<String, ErrorKind> {
    sheet
        .contexts
        .get(ctx)
        .map(|c| c.name.clone())
        .ok_or_else(|| {
            ErrorKind::StructuralPrecondition(format!(
                "context #{ctx} with a pending voice reference is not part of sheet '{}'",
                sheet.name
            ))
        })
}

fn lyrics_at<'a>(
    sheet: &'a mut Sheet,
    ctx: usize,
    name: &str,
) -> Result<&'a mut LyricsContext, ErrorKind> {
    let sheet_name = sheet.name.clone();
    sheet
        .contexts
        .get_mut(ctx)
        .and_then(Context::as_lyrics_mut)
        .ok_or_else(|| {
            ErrorKind::StructuralPrecondition(format!(
                "'{name}' in sheet '{sheet_name}' is not a lyrics context"
            ))
        })
}
