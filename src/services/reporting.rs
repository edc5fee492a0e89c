//! Audit reports
//!
//! Each cycle can write two files into the report directory: a JSON document
//! with every file's outcome plus a language analysis, and a plain-text
//! summary meant for skimming. Analysis only looks at files that were
//! inspected successfully and are not seeding.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::media::{Track, TrackInventory, TrackKind, TrackSelection};
use crate::torrent::SeedMatch;

/// Why a file was left unmodified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Seeding,
    AlreadyCompliant,
    NoSuitableTracks,
    ProcessingError,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Seeding => "File is currently seeding",
            SkipReason::AlreadyCompliant => {
                "File already compliant (audio OK + English subtitles as default)"
            }
            SkipReason::NoSuitableTracks => "No suitable tracks found for modification",
            SkipReason::ProcessingError => "General processing error",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Track as recorded in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: u64,
    pub kind: TrackKind,
    pub language: Option<String>,
    pub name: Option<String>,
    pub is_default: bool,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id,
            kind: track.kind,
            language: track.language.clone(),
            name: track.name.clone(),
            is_default: track.is_default,
        }
    }
}

impl TrackSummary {
    fn language_or_unknown(&self) -> &str {
        self.language.as_deref().unwrap_or("unknown")
    }

    fn as_track(&self) -> Track {
        Track {
            id: self.id,
            kind: self.kind,
            language: self.language.clone(),
            name: self.name.clone(),
            is_default: self.is_default,
        }
    }
}

/// Outcome of auditing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub file_path: String,
    pub series_title: String,
    pub episode_title: String,
    pub file_size: u64,
    pub is_seeded: bool,
    pub seed_match: Option<SeedMatch>,
    pub was_modified: bool,
    pub error_message: Option<String>,
    pub audio_tracks: Vec<TrackSummary>,
    pub subtitle_tracks: Vec<TrackSummary>,
    pub selected_audio_track: Option<u64>,
    pub selected_subtitle_track: Option<u64>,
    pub audio_language_code: Option<String>,
    pub subtitle_language_code: Option<String>,
    pub was_compliant: bool,
    /// Whether the written selection is expected to make the file compliant
    pub projected_compliant: Option<bool>,
    pub skip_reason: Option<SkipReason>,
    pub has_single_audio_track: bool,
}

impl FileReport {
    pub fn new(
        file_path: impl Into<String>,
        series_title: impl Into<String>,
        episode_title: impl Into<String>,
        file_size: Option<u64>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            series_title: series_title.into(),
            episode_title: episode_title.into(),
            file_size: file_size.unwrap_or(0),
            is_seeded: false,
            seed_match: None,
            was_modified: false,
            error_message: None,
            audio_tracks: Vec::new(),
            subtitle_tracks: Vec::new(),
            selected_audio_track: None,
            selected_subtitle_track: None,
            audio_language_code: None,
            subtitle_language_code: None,
            was_compliant: false,
            projected_compliant: None,
            skip_reason: None,
            has_single_audio_track: false,
        }
    }

    pub fn seeded(mut self, seed_match: SeedMatch) -> Self {
        self.is_seeded = true;
        self.seed_match = Some(seed_match);
        self.skip_reason = Some(SkipReason::Seeding);
        self
    }

    pub fn with_inventory(mut self, inventory: &TrackInventory) -> Self {
        let classified = inventory.classify();
        self.audio_tracks = classified.audio.iter().map(|t| TrackSummary::from(*t)).collect();
        self.subtitle_tracks = classified
            .subtitles
            .iter()
            .map(|t| TrackSummary::from(*t))
            .collect();
        self.has_single_audio_track = classified.has_single_audio_track();
        self
    }

    pub fn compliant(mut self) -> Self {
        self.was_compliant = true;
        self.skip_reason = Some(SkipReason::AlreadyCompliant);
        self
    }

    pub fn no_suitable_tracks(mut self) -> Self {
        self.skip_reason = Some(SkipReason::NoSuitableTracks);
        self
    }

    pub fn modified(mut self, selection: &TrackSelection, projected_compliant: bool) -> Self {
        self.was_modified = true;
        self.selected_audio_track = selection.audio_track_id;
        self.selected_subtitle_track = selection.subtitle_track_id;
        self.audio_language_code = selection.audio_language.clone();
        self.subtitle_language_code = selection.subtitle_language.clone();
        self.projected_compliant = Some(projected_compliant);
        self
    }

    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self.skip_reason = Some(SkipReason::ProcessingError);
        self.audio_tracks.clear();
        self.subtitle_tracks.clear();
        self.has_single_audio_track = false;
        self
    }

    /// Inspected successfully and not seeding
    fn is_analyzable(&self) -> bool {
        !self.is_seeded && self.error_message.is_none()
    }

    fn all_tracks(&self) -> impl Iterator<Item = &TrackSummary> {
        self.audio_tracks.iter().chain(self.subtitle_tracks.iter())
    }

    fn has_japanese_audio(&self) -> bool {
        self.audio_tracks.iter().any(|t| t.as_track().is_japanese())
    }

    fn has_english_subtitles(&self) -> bool {
        self.subtitle_tracks.iter().any(|t| t.as_track().is_english())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusualLanguage {
    pub file_path: String,
    pub track_type: TrackKind,
    pub language: String,
    pub track_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageMismatch {
    pub file_path: String,
    pub track_type: TrackKind,
    pub language_code: String,
    pub track_name: String,
    pub issue: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackNameUsage {
    pub count: usize,
    /// First few files using the name
    pub files: Vec<String>,
    pub track_types: BTreeSet<TrackKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleAudioFile {
    pub file_path: String,
    pub audio_language: String,
    pub audio_track_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttentionItem {
    pub file_path: String,
    pub issue: String,
    pub audio_languages: Vec<String>,
    pub subtitle_languages: Vec<String>,
}

/// Aggregate language statistics over a cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageAnalysis {
    pub audio_languages: BTreeMap<String, usize>,
    pub subtitle_languages: BTreeMap<String, usize>,
    pub missing_japanese_audio: Vec<String>,
    pub missing_english_subs: Vec<String>,
    pub unusual_language_codes: Vec<UnusualLanguage>,
    pub common_track_names: BTreeMap<String, TrackNameUsage>,
    pub potential_language_mismatches: Vec<LanguageMismatch>,
    pub single_audio_track_files: Vec<SingleAudioFile>,
    pub audio_track_count_distribution: BTreeMap<usize, usize>,
    pub files_needing_attention: Vec<AttentionItem>,
}

const TRACK_NAME_SAMPLE_FILES: usize = 5;
const JAPANESE_NAME_HINTS: &[&str] = &["jpn", "japanese", "ja"];
const ENGLISH_NAME_HINTS: &[&str] = &["eng", "english", "en"];

/// Flag tracks whose name hints at a different language than their tag
fn detect_mismatch(track: &Track) -> Option<&'static str> {
    let name = track.name.as_deref()?.to_lowercase();
    let language = track.normalized_language()?;
    let hints = |terms: &[&str]| terms.iter().any(|t| name.contains(t));

    if track.is_japanese() {
        hints(ENGLISH_NAME_HINTS).then_some("Name suggests English but code is Japanese")
    } else if track.is_english() {
        hints(JAPANESE_NAME_HINTS).then_some("Name suggests Japanese but code is English")
    } else if !language.is_empty() && (hints(JAPANESE_NAME_HINTS) || hints(ENGLISH_NAME_HINTS)) {
        Some("Name suggests Japanese/English but code is different")
    } else {
        None
    }
}

fn is_unusual_language(track: &Track) -> bool {
    track
        .normalized_language()
        .is_some_and(|code| !track.is_japanese() && !track.is_english() && code != "unknown")
}

impl LanguageAnalysis {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut analysis = LanguageAnalysis::default();

        for report in reports.iter().filter(|r| r.is_analyzable()) {
            for track in &report.audio_tracks {
                *analysis
                    .audio_languages
                    .entry(track.language_or_unknown().to_string())
                    .or_default() += 1;
            }
            for track in &report.subtitle_tracks {
                *analysis
                    .subtitle_languages
                    .entry(track.language_or_unknown().to_string())
                    .or_default() += 1;
            }

            let has_japanese_audio = report.has_japanese_audio();
            let has_english_subs = report.has_english_subtitles();
            if !has_japanese_audio {
                analysis.missing_japanese_audio.push(report.file_path.clone());
            }
            if !has_english_subs {
                analysis.missing_english_subs.push(report.file_path.clone());
            }

            for summary in report.all_tracks() {
                let track = summary.as_track();
                if is_unusual_language(&track) {
                    analysis.unusual_language_codes.push(UnusualLanguage {
                        file_path: report.file_path.clone(),
                        track_type: track.kind,
                        language: summary.language_or_unknown().to_string(),
                        track_id: track.id,
                    });
                }

                if let Some(issue) = detect_mismatch(&track) {
                    analysis.potential_language_mismatches.push(LanguageMismatch {
                        file_path: report.file_path.clone(),
                        track_type: track.kind,
                        language_code: summary.language_or_unknown().to_string(),
                        track_name: track.name.clone().unwrap_or_default(),
                        issue: issue.to_string(),
                    });
                }

                if let Some(name) = track.name.as_deref().filter(|n| !n.is_empty()) {
                    let usage = analysis
                        .common_track_names
                        .entry(name.to_string())
                        .or_default();
                    usage.count += 1;
                    if usage.files.len() < TRACK_NAME_SAMPLE_FILES {
                        usage.files.push(report.file_path.clone());
                    }
                    usage.track_types.insert(track.kind);
                }
            }

            if let [only] = report.audio_tracks.as_slice() {
                analysis.single_audio_track_files.push(SingleAudioFile {
                    file_path: report.file_path.clone(),
                    audio_language: only.language_or_unknown().to_string(),
                    audio_track_name: only.name.clone().unwrap_or_default(),
                });
            }

            *analysis
                .audio_track_count_distribution
                .entry(report.audio_tracks.len())
                .or_default() += 1;

            if !report.audio_tracks.is_empty()
                && !report.subtitle_tracks.is_empty()
                && !has_english_subs
            {
                let issue = if has_japanese_audio {
                    "Has Japanese audio but no English subtitles"
                } else {
                    "No Japanese audio and no English subtitles"
                };
                analysis.files_needing_attention.push(AttentionItem {
                    file_path: report.file_path.clone(),
                    issue: issue.to_string(),
                    audio_languages: report
                        .audio_tracks
                        .iter()
                        .map(|t| t.language_or_unknown().to_string())
                        .collect(),
                    subtitle_languages: report
                        .subtitle_tracks
                        .iter()
                        .map(|t| t.language_or_unknown().to_string())
                        .collect(),
                });
            }
        }

        analysis
    }
}

/// Top-level JSON report document
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport<'a> {
    pub generated_at: String,
    pub total_files: usize,
    pub files_modified: usize,
    pub files_skipped_seeding: usize,
    pub files_with_errors: usize,
    pub files_already_compliant: usize,
    pub language_analysis: LanguageAnalysis,
    pub reports: &'a [FileReport],
}

impl<'a> AuditReport<'a> {
    pub fn new(reports: &'a [FileReport], generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339(),
            total_files: reports.len(),
            files_modified: reports.iter().filter(|r| r.was_modified).count(),
            files_skipped_seeding: reports.iter().filter(|r| r.is_seeded).count(),
            files_with_errors: reports.iter().filter(|r| r.error_message.is_some()).count(),
            files_already_compliant: reports.iter().filter(|r| r.was_compliant).count(),
            language_analysis: LanguageAnalysis::from_reports(reports),
            reports,
        }
    }
}

fn write_sample(out: &mut String, items: &[String], limit: usize, indent: &str) -> std::fmt::Result {
    for item in items.iter().take(limit) {
        writeln!(out, "{indent}- {item}")?;
    }
    if items.len() > limit {
        writeln!(out, "{indent}... and {} more", items.len() - limit)?;
    }
    Ok(())
}

fn write_tracks(out: &mut String, label: &str, tracks: &[TrackSummary]) -> std::fmt::Result {
    writeln!(out, "  {} Tracks ({}):", label, tracks.len())?;
    for track in tracks {
        writeln!(
            out,
            "    Track {}: {} {}{}",
            track.id,
            track.language_or_unknown(),
            track.name.as_deref().unwrap_or(""),
            if track.is_default { " (default)" } else { "" }
        )?;
    }
    Ok(())
}

fn sorted_by_count(counts: &BTreeMap<String, usize>) -> Vec<(&String, &usize)> {
    let mut entries: Vec<_> = counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    entries
}

/// Render the plain-text summary
pub fn render_summary(report: &AuditReport<'_>, generated_at: DateTime<Local>) -> Result<String, std::fmt::Error> {
    let reports = report.reports;
    let analysis = &report.language_analysis;
    let rule = |n: usize| "=".repeat(n);
    let mut out = String::new();

    writeln!(out, "Anime Language Processing Report")?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{}\n", rule(50))?;

    writeln!(out, "Summary:")?;
    writeln!(out, "  Total files processed: {}", report.total_files)?;
    writeln!(out, "  Files modified: {}", report.files_modified)?;
    writeln!(out, "  Files skipped (seeding): {}", report.files_skipped_seeding)?;
    writeln!(out, "  Files with errors: {}", report.files_with_errors)?;
    writeln!(out, "  Files already compliant: {}", report.files_already_compliant)?;
    writeln!(
        out,
        "  Files with single audio track: {}\n",
        reports.iter().filter(|r| r.has_single_audio_track).count()
    )?;

    let mut by_reason: BTreeMap<SkipReason, Vec<String>> = BTreeMap::new();
    for r in reports.iter().filter(|r| !r.was_modified) {
        if let Some(reason) = r.skip_reason {
            by_reason.entry(reason).or_default().push(r.file_path.clone());
        }
    }
    if !by_reason.is_empty() {
        writeln!(out, "Files Skipped by Reason:")?;
        writeln!(out, "{}", rule(30))?;
        for (reason, files) in &by_reason {
            writeln!(out, "  {}: {} files", reason, files.len())?;
            write_sample(&mut out, files, 5, "    ")?;
            writeln!(out)?;
        }
    }

    if reports.iter().any(|r| r.is_analyzable()) {
        writeln!(out, "Language Analysis:")?;
        writeln!(out, "{}", rule(20))?;

        if !analysis.audio_languages.is_empty() {
            writeln!(out, "  Audio Languages Found:")?;
            for (lang, count) in sorted_by_count(&analysis.audio_languages) {
                writeln!(out, "    {}: {} tracks", lang, count)?;
            }
        }
        if !analysis.audio_track_count_distribution.is_empty() {
            writeln!(out, "  Audio Track Count Distribution:")?;
            for (tracks, files) in &analysis.audio_track_count_distribution {
                writeln!(out, "    {} track(s): {} files", tracks, files)?;
            }
        }
        if !analysis.subtitle_languages.is_empty() {
            writeln!(out, "  Subtitle Languages Found:")?;
            for (lang, count) in sorted_by_count(&analysis.subtitle_languages) {
                writeln!(out, "    {}: {} tracks", lang, count)?;
            }
        }
        if !analysis.missing_japanese_audio.is_empty() {
            writeln!(out, "  Files Missing Japanese Audio: {}", analysis.missing_japanese_audio.len())?;
            write_sample(&mut out, &analysis.missing_japanese_audio, 3, "    ")?;
        }
        if !analysis.missing_english_subs.is_empty() {
            writeln!(out, "  Files Missing English Subtitles: {}", analysis.missing_english_subs.len())?;
            write_sample(&mut out, &analysis.missing_english_subs, 3, "    ")?;
        }

        if !analysis.unusual_language_codes.is_empty() {
            writeln!(out, "  Files with Unusual Language Codes (may need attention):")?;
            let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
            for entry in &analysis.unusual_language_codes {
                groups
                    .entry(entry.language.as_str())
                    .or_default()
                    .push(format!("{} ({})", entry.file_path, entry.track_type));
            }
            for (lang, entries) in &groups {
                writeln!(out, "    {}: {} tracks", lang, entries.len())?;
                write_sample(&mut out, entries, 3, "      ")?;
            }
        }

        if !analysis.common_track_names.is_empty() {
            writeln!(out, "  Common Track Names (may indicate language code issues):")?;
            let mut names: Vec<_> = analysis.common_track_names.iter().collect();
            names.sort_by(|a, b| b.1.count.cmp(&a.1.count));
            for (name, usage) in names.into_iter().take(10) {
                writeln!(out, "    '{}': {} occurrences", name, usage.count)?;
                for file in usage.files.iter().take(3) {
                    writeln!(out, "      - {}", file)?;
                }
            }
        }
        writeln!(out)?;
    }

    if !analysis.potential_language_mismatches.is_empty() {
        let mismatches = &analysis.potential_language_mismatches;
        writeln!(out, "Potential Language Code Mismatches:")?;
        writeln!(out, "{}", rule(35))?;
        writeln!(out, "  Total: {} potential mismatches\n", mismatches.len())?;
        for mismatch in mismatches.iter().take(10) {
            writeln!(out, "  {}", mismatch.file_path)?;
            writeln!(out, "    Track: {}", mismatch.track_type)?;
            writeln!(out, "    Language Code: {}", mismatch.language_code)?;
            writeln!(out, "    Track Name: '{}'", mismatch.track_name)?;
            writeln!(out, "    Issue: {}\n", mismatch.issue)?;
        }
        if mismatches.len() > 10 {
            writeln!(out, "  ... and {} more potential mismatches\n", mismatches.len() - 10)?;
        }
    }

    let attention: Vec<&AttentionItem> = analysis
        .files_needing_attention
        .iter()
        .filter(|item| {
            reports
                .iter()
                .any(|r| r.file_path == item.file_path && !r.was_compliant)
        })
        .collect();
    if !attention.is_empty() {
        writeln!(out, "Files That May Need Manual Attention:")?;
        writeln!(out, "{}", rule(35))?;
        writeln!(out, "  Total: {} files\n", attention.len())?;
        for item in attention.iter().take(10) {
            writeln!(out, "  - {}", item.file_path)?;
            writeln!(out, "    Issue: {}", item.issue)?;
        }
        if attention.len() > 10 {
            writeln!(out, "  ... and {} more", attention.len() - 10)?;
        }
        writeln!(out)?;
    }

    let single_audio = &analysis.single_audio_track_files;
    if !single_audio.is_empty() {
        writeln!(out, "Files with Single Audio Track:")?;
        writeln!(out, "{}", rule(30))?;
        writeln!(out, "  Total: {} files", single_audio.len())?;
        writeln!(out, "  These files are treated as 'audio OK' regardless of language\n")?;
        for file in single_audio.iter().take(5) {
            writeln!(out, "  - {}", file.file_path)?;
            writeln!(out, "    Audio: {} {}", file.audio_language, file.audio_track_name)?;
        }
        if single_audio.len() > 5 {
            writeln!(out, "  ... and {} more", single_audio.len() - 5)?;
        }
        writeln!(out)?;
    }

    if !by_reason.is_empty() {
        writeln!(out, "Most Common Issues:")?;
        writeln!(out, "{}", rule(20))?;
        let mut issues: Vec<_> = by_reason.iter().map(|(r, f)| (r, f.len())).collect();
        issues.sort_by(|a, b| b.1.cmp(&a.1));
        for (reason, count) in issues {
            writeln!(out, "  {}: {} files", reason, count)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Detailed File Information:")?;
    writeln!(out, "{}\n", rule(50))?;
    for (i, r) in reports.iter().enumerate() {
        writeln!(out, "File {}: {}", i + 1, r.file_path)?;
        writeln!(out, "  Series: {}", r.series_title)?;
        writeln!(out, "  Episode: {}", r.episode_title)?;
        writeln!(out, "  Size: {} bytes", r.file_size)?;
        write!(out, "  Status: {}", if r.is_seeded { "Seeded" } else { "Not Seeded" })?;
        if r.was_modified {
            write!(out, " | Modified")?;
        }
        if r.was_compliant {
            write!(out, " | Already Compliant")?;
        }
        if let Some(error) = &r.error_message {
            write!(out, " | Error: {}", error)?;
        }
        if let Some(reason) = r.skip_reason
            && !r.was_modified
        {
            write!(out, " | Skipped: {}", reason)?;
        }
        writeln!(out)?;

        write_tracks(&mut out, "Audio", &r.audio_tracks)?;
        write_tracks(&mut out, "Subtitle", &r.subtitle_tracks)?;
        if let Some(id) = r.selected_audio_track {
            writeln!(
                out,
                "  Selected Audio: Track {} ({})",
                id,
                r.audio_language_code.as_deref().unwrap_or("unchanged")
            )?;
        }
        if let Some(id) = r.selected_subtitle_track {
            writeln!(
                out,
                "  Selected Subtitle: Track {} ({})",
                id,
                r.subtitle_language_code.as_deref().unwrap_or("unchanged")
            )?;
        }
        writeln!(out)?;
    }

    Ok(out)
}

/// Paths of the files written for one cycle
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub summary: PathBuf,
}

/// Writes cycle reports into a directory
pub struct ReportWriter {
    directory: PathBuf,
}

impl ReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write the JSON report and text summary for a cycle
    pub async fn write(&self, reports: &[FileReport]) -> Result<ReportPaths> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create report directory '{}'", self.directory.display()))?;

        let generated_at = Local::now();
        let stamp = generated_at.format("%Y%m%d_%H%M%S");
        let paths = ReportPaths {
            json: self.directory.join(format!("anime_language_report_{}.json", stamp)),
            summary: self.directory.join(format!("anime_language_summary_{}.txt", stamp)),
        };

        let report = AuditReport::new(reports, generated_at);
        let json = serde_json::to_vec_pretty(&report).context("Failed to serialize report")?;
        tokio::fs::write(&paths.json, json)
            .await
            .with_context(|| format!("Failed to write '{}'", paths.json.display()))?;

        let summary = render_summary(&report, generated_at).context("Failed to render summary")?;
        tokio::fs::write(&paths.summary, summary)
            .await
            .with_context(|| format!("Failed to write '{}'", paths.summary.display()))?;

        info!(
            report = %paths.json.display(),
            summary = %paths.summary.display(),
            files = reports.len(),
            "Report generated"
        );
        Ok(paths)
    }
}
