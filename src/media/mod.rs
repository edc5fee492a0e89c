//! Default-track policy: Japanese audio, English subtitles
//!
//! Everything in this module is a pure function of a [`TrackInventory`]
//! snapshot. Inspection and mutation live in
//! [`services::mkvtoolnix`](crate::services::mkvtoolnix).

pub mod compliance;
pub mod language;
pub mod patterns;
pub mod selection;
pub mod tracks;

pub use compliance::{Compliance, evaluate, is_compliant};
pub use language::{ENGLISH, JAPANESE, normalize_language};
pub use selection::{SubtitleChoice, TrackSelection, select_tracks};
pub use tracks::{ClassifiedTracks, Track, TrackInventory, TrackKind};
