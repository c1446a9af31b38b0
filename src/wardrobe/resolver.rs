//! Attachment bone resolution.
//!
//! Generated avatars and third-party rigs do not always share bone-naming
//! conventions; each mapping's fallback chain absorbs that skew. Resolution
//! is pure: given the set of bone names actually present in the loaded
//! skeleton, pick the first candidate that exists.

use rustc_hash::FxHashSet;

use crate::errors::AttachmentResolutionError;
use crate::wardrobe::catalog::EquipmentMapping;

/// Picks the mount bone for `mapping` out of `loaded_bones`.
///
/// Tries the primary `attachment_bone` first, then each fallback in listed
/// order. Fails only when no candidate is present, a recoverable per-item
/// condition: callers skip that item and continue with the rest.
pub fn resolve_bone<'m>(
    loaded_bones: &FxHashSet<String>,
    mapping: &'m EquipmentMapping,
) -> Result<&'m str, AttachmentResolutionError> {
    for candidate in mapping.candidates() {
        if loaded_bones.contains(candidate) {
            return Ok(candidate);
        }
    }

    Err(AttachmentResolutionError {
        item_id: mapping.item_id.clone(),
        candidates: mapping.candidates().map(ToString::to_string).collect(),
    })
}
