//! Staff-wide sign sharing.
//!
//! CanorusML repeats a clef, key signature, time signature or barline in
//! every voice it applies to. When such a sign is read, an equal sign at
//! the same time that the voice does not reference yet is reused, so all
//! voices end up pointing at one canonical instance.

use log::trace;

use crate::model::{Sign, SignId, Staff};

/// Attach a freshly read staff-wide `sign` to voice `voice` of `staff`.
///
/// Among the staff's canonical signs of the same kind, time-start and
/// content, the first one (in canonical-list order) that the voice does
/// not reference yet is reused and `sign` is dropped. Otherwise `sign`
/// becomes a new canonical sign. Either way the voice gets a handle
/// appended. Returns `None` when `voice` is not a voice of `staff`.
pub fn attach_shared_sign(staff: &mut Staff, voice: usize, sign: Sign) -> Option<SignId> {
    let current = staff.voices.get(voice)?;
    let found = staff
        .shared_signs()
        .find(|&(id, existing)| {
            existing.time_start == sign.time_start
                && existing.kind == sign.kind
                && !current.contains(id)
        })
        .map(|(id, _)| id);

    let id = match found {
        Some(id) => {
            trace!(
                "voice '{}': sharing {:?} at {} (sign {})",
                current.name,
                sign.sign_type(),
                sign.time_start,
                id.0
            );
            id
        }
        None => {
            let id = staff.push_sign(sign);
            staff.insert_shared(id);
            id
        }
    };

    staff.voices.get_mut(voice)?.signs.push(id);
    Some(id)
}
