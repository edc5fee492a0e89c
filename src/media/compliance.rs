//! Default-track compliance check
//!
//! A file is compliant when its default audio is Japanese (or it only has one
//! audio track) and its default subtitle is English.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tracks::{Track, TrackInventory};

/// Outcome of the compliance check, split per track kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compliance {
    /// Default audio is acceptable
    pub audio_ok: bool,
    /// Default subtitle is English
    pub subtitles_ok: bool,
}

impl Compliance {
    pub fn is_compliant(&self) -> bool {
        self.audio_ok && self.subtitles_ok
    }
}

/// First track flagged default, in inventory order.
///
/// Inspection tools do not guarantee a single default per kind; when several
/// are flagged the earliest one is taken.
fn first_default<'a>(tracks: &[&'a Track]) -> Option<&'a Track> {
    let mut defaults = tracks.iter().filter(|t| t.is_default);
    let first = defaults.next().copied();
    let extra = defaults.count();
    if extra > 0
        && let Some(track) = first
    {
        debug!(
            track_id = track.id,
            kind = %track.kind,
            extra_defaults = extra,
            "Multiple tracks flagged default, using the first"
        );
    }
    first
}

/// Evaluate both halves of the policy
pub fn evaluate(inventory: &TrackInventory) -> Compliance {
    let classified = inventory.classify();

    // A lone audio track cannot be mis-defaulted
    let audio_ok = classified.has_single_audio_track()
        || first_default(&classified.audio).is_some_and(|t| t.is_japanese());

    let subtitles_ok = first_default(&classified.subtitles).is_some_and(|t| t.is_english());

    Compliance {
        audio_ok,
        subtitles_ok,
    }
}

/// Whether the inventory already satisfies the default-track policy
pub fn is_compliant(inventory: &TrackInventory) -> bool {
    evaluate(inventory).is_compliant()
}
