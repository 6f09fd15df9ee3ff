//! Post-load voice repair.
//!
//! A staff-wide sign applies to every voice of its staff. Streaming order
//! can leave a voice without a sign the others share (a voice declared
//! without its own copy, or one that ended early). This pass adds the
//! missing handles once the whole document has been read.

use log::debug;

use crate::model::{Context, Document, SignId, SignType, Staff};

/// Give every voice of `staff` the canonical staff-wide signs it lacks.
///
/// A voice lacks a sign when it has nothing of that kind at that
/// time-start; a voice with its own differing sign there is left alone.
/// The handle goes before the first sign that starts later or is a note
/// or rest starting at the same time. Returns the number of handles
/// inserted; running the pass again inserts nothing.
pub fn repair_staff(staff: &mut Staff) -> usize {
    let shared: Vec<(SignId, i32, SignType)> = staff
        .shared_signs()
        .map(|(id, s)| (id, s.time_start, s.sign_type()))
        .collect();

    let mut inserted = 0;
    for vi in 0..staff.voices.len() {
        for &(id, time, sign_type) in &shared {
            let voice = &staff.voices[vi];
            let present = voice.signs.iter().any(|&other| {
                staff
                    .sign(other)
                    .is_some_and(|s| s.time_start == time && s.sign_type() == sign_type)
            });
            if present {
                continue;
            }

            let pos = voice
                .signs
                .iter()
                .position(|&other| {
                    staff.sign(other).is_some_and(|s| {
                        s.time_start > time || (s.time_start == time && s.is_playable())
                    })
                })
                .unwrap_or(voice.signs.len());
            staff.voices[vi].signs.insert(pos, id);
            inserted += 1;
        }
    }
    inserted
}

/// Run [`repair_staff`] over every staff of every sheet.
pub fn repair_document(document: &mut Document) -> usize {
    let mut inserted = 0;
    for sheet in &mut document.sheets {
        for staff in sheet.contexts.iter_mut().filter_map(Context::as_staff_mut) {
            inserted += repair_staff(staff);
        }
    }
    if inserted > 0 {
        debug!("voice repair added {inserted} shared sign reference(s)");
    }
    inserted
}
