//! Track-name heuristics
//!
//! Release groups label tracks inconsistently, so language tags alone are not
//! enough. The term lists below are the policy data; each predicate is a
//! case-insensitive "contains any term" search over the track name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Audio names that indicate a Japanese track even when the tag says otherwise
pub const JAPANESE_AUDIO_TERMS: &[&str] = &["jap", "jpn", "japanese"];

/// Subtitle names that indicate a signs/songs-only track
pub const SIGNS_TERMS: &[&str] = &["signs", "songs", "lyrics"];

/// Subtitle names that indicate a complete dialogue track
pub const FULL_DIALOGUE_TERMS: &[&str] = &["full", "dialogue", "sdh"];

static JAPANESE_AUDIO_RE: Lazy<Regex> = Lazy::new(|| build_pattern(JAPANESE_AUDIO_TERMS));
static SIGNS_RE: Lazy<Regex> = Lazy::new(|| build_pattern(SIGNS_TERMS));
static FULL_DIALOGUE_RE: Lazy<Regex> = Lazy::new(|| build_pattern(FULL_DIALOGUE_TERMS));

/// Build a case-insensitive alternation of literal terms
fn build_pattern(terms: &[&str]) -> Regex {
    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", alternation)).unwrap()
}

fn matches(re: &Regex, name: Option<&str>) -> bool {
    name.is_some_and(|n| re.is_match(n))
}

/// Audio track name suggests Japanese ("Japanese", "JPN 2.0", "Jap Dub")
pub fn is_japanese_audio_name(name: Option<&str>) -> bool {
    matches(&JAPANESE_AUDIO_RE, name)
}

/// Subtitle track name suggests signs/songs only
pub fn is_signs_name(name: Option<&str>) -> bool {
    matches(&SIGNS_RE, name)
}

/// Subtitle track name suggests full dialogue
pub fn is_full_dialogue_name(name: Option<&str>) -> bool {
    matches(&FULL_DIALOGUE_RE, name)
}
