//! Default-track selection for non-compliant files
//!
//! Produces a [`TrackSelection`]: a declarative description of which audio and
//! subtitle tracks should carry the default flag. Nothing here touches the
//! file; the mutation step translates the selection into edits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::language::{ENGLISH, JAPANESE};
use super::patterns::{is_full_dialogue_name, is_japanese_audio_name, is_signs_name};
use super::tracks::{Track, TrackInventory};

/// Intended default-track changes for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSelection {
    /// Audio track to make default
    pub audio_track_id: Option<u64>,

    /// Subtitle track to make default
    pub subtitle_track_id: Option<u64>,

    /// Whether audio defaults are touched at all
    pub change_audio: bool,

    /// Language to stamp on the chosen audio track
    pub audio_language: Option<String>,

    /// Language to stamp on the chosen subtitle track
    pub subtitle_language: Option<String>,
}

impl TrackSelection {
    /// Nothing to write: no audio and no subtitle track was chosen
    pub fn is_noop(&self) -> bool {
        self.audio_track_id.is_none() && self.subtitle_track_id.is_none()
    }
}

/// Where the chosen subtitle came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleChoice {
    /// English track, preferring full dialogue over signs/songs
    English(u64),
    /// No English track exists; first subtitle of any language
    AnyLanguage(u64),
}

impl SubtitleChoice {
    pub fn track_id(&self) -> u64 {
        match self {
            SubtitleChoice::English(id) | SubtitleChoice::AnyLanguage(id) => *id,
        }
    }

    /// Language to stamp; unknown-language fallbacks are left as they are
    pub fn language(&self) -> Option<&'static str> {
        match self {
            SubtitleChoice::English(_) => Some(ENGLISH),
            SubtitleChoice::AnyLanguage(_) => None,
        }
    }
}

/// First audio track tagged Japanese or named like one
pub fn japanese_audio_candidate<'a>(audio: &[&'a Track]) -> Option<&'a Track> {
    audio
        .iter()
        .find(|t| t.is_japanese() || is_japanese_audio_name(t.name.as_deref()))
        .copied()
}

/// Pick the subtitle track that should become default.
///
/// Order of preference:
/// 1. English, not signs/songs, named full/dialogue/SDH
/// 2. English, not signs/songs
/// 3. First English track (signs-only releases)
/// 4. First subtitle track of any language
pub fn choose_subtitle(subtitles: &[&Track]) -> Option<SubtitleChoice> {
    let english: Vec<&Track> = subtitles.iter().copied().filter(|t| t.is_english()).collect();

    let mut dialogue: Vec<&Track> = english
        .iter()
        .copied()
        .filter(|t| !is_signs_name(t.name.as_deref()))
        .collect();
    // Stable: ties keep inventory order
    dialogue.sort_by_key(|t| !is_full_dialogue_name(t.name.as_deref()));

    if let Some(track) = dialogue.first().or_else(|| english.first()) {
        return Some(SubtitleChoice::English(track.id));
    }

    subtitles
        .first()
        .map(|track| SubtitleChoice::AnyLanguage(track.id))
}

/// Decide which tracks to flag default. Intended for non-compliant files.
pub fn select_tracks(inventory: &TrackInventory) -> TrackSelection {
    let classified = inventory.classify();
    let subtitle = choose_subtitle(&classified.subtitles);

    let (change_audio, audio_track_id, audio_language) = if classified.has_single_audio_track() {
        (false, None, None)
    } else {
        match japanese_audio_candidate(&classified.audio) {
            Some(track) => (true, Some(track.id), Some(JAPANESE.to_string())),
            None => (false, None, None),
        }
    };

    let selection = TrackSelection {
        audio_track_id,
        subtitle_track_id: subtitle.map(|s| s.track_id()),
        change_audio,
        audio_language,
        subtitle_language: subtitle.and_then(|s| s.language()).map(str::to_string),
    };

    debug!(
        audio_tracks = classified.audio.len(),
        subtitle_tracks = classified.subtitles.len(),
        audio_track_id = ?selection.audio_track_id,
        subtitle_track_id = ?selection.subtitle_track_id,
        change_audio = selection.change_audio,
        "Track selection computed"
    );

    selection
}
