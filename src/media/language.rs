//! Language tag normalization
//!
//! Container language tags arrive in whatever form the muxing tool wrote them:
//! ISO 639-1 ("ja"), ISO 639-2 ("jpn"), or spelled out ("Japanese"). Policy
//! decisions only care about two languages, so those collapse onto a single
//! canonical code and everything else is passed through for reporting.

/// Canonical code for Japanese
pub const JAPANESE: &str = "jpn";

/// Canonical code for English
pub const ENGLISH: &str = "eng";

const JAPANESE_ALIASES: &[&str] = &["ja", "jpn", "japanese"];
const ENGLISH_ALIASES: &[&str] = &["en", "eng", "english"];

/// Normalize a raw language tag.
///
/// Returns `None` for missing or blank tags. Japanese and English aliases map
/// to [`JAPANESE`] and [`ENGLISH`]; any other tag is returned trimmed and
/// lowercased.
pub fn normalize_language(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim().to_lowercase();
    if code.is_empty() {
        return None;
    }

    if JAPANESE_ALIASES.contains(&code.as_str()) {
        return Some(JAPANESE.to_string());
    }
    if ENGLISH_ALIASES.contains(&code.as_str()) {
        return Some(ENGLISH.to_string());
    }

    Some(code)
}

/// Whether a raw tag normalizes to Japanese
pub fn is_japanese(raw: Option<&str>) -> bool {
    normalize_language(raw).as_deref() == Some(JAPANESE)
}

/// Whether a raw tag normalizes to English
pub fn is_english(raw: Option<&str>) -> bool {
    normalize_language(raw).as_deref() == Some(ENGLISH)
}
