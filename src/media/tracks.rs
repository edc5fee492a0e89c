//! Container track inventory
//!
//! A [`TrackInventory`] is the snapshot of a file's tracks as reported by the
//! inspection tool. It is never edited in place: policy decisions are expressed
//! as a [`TrackSelection`](super::selection::TrackSelection) and the mutation
//! step works from that.

use serde::{Deserialize, Serialize};

use super::language::{self, normalize_language};
use super::selection::TrackSelection;

/// Track kinds relevant to default-track policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Subtitle,
    /// Video, buttons, or anything else the policy ignores
    Other,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitles",
            TrackKind::Other => "other",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One sub-stream inside a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Identifier assigned by the inspection tool, used verbatim for edits
    pub id: u64,

    pub kind: TrackKind,

    /// Raw language tag as stored in the container
    pub language: Option<String>,

    /// Free-text track name
    pub name: Option<String>,

    /// Whether the default flag is currently set
    pub is_default: bool,
}

impl Track {
    pub fn new(id: u64, kind: TrackKind) -> Self {
        Self {
            id,
            kind,
            language: None,
            name: None,
            is_default: false,
        }
    }

    pub fn audio(id: u64) -> Self {
        Self::new(id, TrackKind::Audio)
    }

    pub fn subtitle(id: u64) -> Self {
        Self::new(id, TrackKind::Subtitle)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Language tag after normalization
    pub fn normalized_language(&self) -> Option<String> {
        normalize_language(self.language.as_deref())
    }

    pub fn is_japanese(&self) -> bool {
        language::is_japanese(self.language.as_deref())
    }

    pub fn is_english(&self) -> bool {
        language::is_english(self.language.as_deref())
    }
}

/// Audio and subtitle tracks split out of an inventory, in inventory order
#[derive(Debug, Clone, Default)]
pub struct ClassifiedTracks<'a> {
    pub audio: Vec<&'a Track>,
    pub subtitles: Vec<&'a Track>,
}

impl ClassifiedTracks<'_> {
    pub fn has_single_audio_track(&self) -> bool {
        self.audio.len() == 1
    }
}

/// Ordered tracks of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInventory {
    tracks: Vec<Track>,
}

impl TrackInventory {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// All tracks of one kind, in inventory order
    pub fn of_kind(&self, kind: TrackKind) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }

    /// Split into audio and subtitle groups. Other kinds are dropped.
    pub fn classify(&self) -> ClassifiedTracks<'_> {
        let mut classified = ClassifiedTracks::default();
        for track in &self.tracks {
            match track.kind {
                TrackKind::Audio => classified.audio.push(track),
                TrackKind::Subtitle => classified.subtitles.push(track),
                TrackKind::Other => {}
            }
        }
        classified
    }

    /// Project what the inventory would look like once `selection` has been
    /// written to the file.
    ///
    /// Mirrors the mutation step: every track of a managed kind loses its
    /// default flag, then the selected track gains it along with the stamped
    /// language. Audio is only managed when `change_audio` is set.
    pub fn with_selection_applied(&self, selection: &TrackSelection) -> TrackInventory {
        let tracks = self
            .tracks
            .iter()
            .map(|track| {
                let mut track = track.clone();
                let (managed, chosen, language) = match track.kind {
                    TrackKind::Audio => (
                        selection.change_audio,
                        selection.audio_track_id,
                        selection.audio_language.as_deref(),
                    ),
                    TrackKind::Subtitle => (
                        true,
                        selection.subtitle_track_id,
                        selection.subtitle_language.as_deref(),
                    ),
                    TrackKind::Other => (false, None, None),
                };

                if managed {
                    track.is_default = false;
                    if chosen == Some(track.id) {
                        track.is_default = true;
                        if let Some(language) = language {
                            track.language = Some(language.to_string());
                        }
                    }
                }
                track
            })
            .collect();

        TrackInventory { tracks }
    }
}

impl From<Vec<Track>> for TrackInventory {
    fn from(tracks: Vec<Track>) -> Self {
        Self::new(tracks)
    }
}
