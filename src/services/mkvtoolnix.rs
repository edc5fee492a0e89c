//! MKVToolNix integration
//!
//! Uses `mkvmerge -J` to read a file's track inventory and `mkvpropedit` to
//! rewrite default/forced flags and language tags in place. Both are run as
//! external processes; mkvmerge's JSON identification output is stable across
//! releases, so it is parsed directly.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::media::{Track, TrackInventory, TrackKind, TrackSelection};

/// mkvmerge identification JSON
mod mkvmerge {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct Identification {
        pub tracks: Option<Vec<IdentifiedTrack>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct IdentifiedTrack {
        pub id: Option<u64>,
        #[serde(rename = "type")]
        pub track_type: Option<String>,
        pub properties: Option<Properties>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Properties {
        pub language: Option<String>,
        pub language_ietf: Option<String>,
        pub track_name: Option<String>,
        pub default_track: Option<bool>,
    }
}

/// Parse `mkvmerge -J` output into a track inventory.
///
/// Tracks without an id cannot be edited and are skipped. The legacy
/// `language` property is preferred; `language_ietf` fills in when it is
/// missing or `und`.
pub fn parse_identification(json: &[u8]) -> Result<TrackInventory> {
    let identification: mkvmerge::Identification =
        serde_json::from_slice(json).context("Failed to parse mkvmerge JSON output")?;

    let tracks = identification
        .tracks
        .unwrap_or_default()
        .into_iter()
        .filter_map(|t| {
            let id = t.id?;
            let kind = match t.track_type.as_deref() {
                Some("audio") => TrackKind::Audio,
                Some("subtitles") => TrackKind::Subtitle,
                _ => TrackKind::Other,
            };
            let props = t.properties;
            let language = props.as_ref().and_then(|p| {
                match p.language.as_deref() {
                    Some(lang) if !lang.trim().is_empty() && lang != "und" => Some(lang.to_string()),
                    legacy => p.language_ietf.clone().or(legacy.map(str::to_string)),
                }
            });
            Some(Track {
                id,
                kind,
                language,
                name: props.as_ref().and_then(|p| p.track_name.clone()),
                is_default: props.as_ref().and_then(|p| p.default_track).unwrap_or(false),
            })
        })
        .collect();

    Ok(TrackInventory::new(tracks))
}

/// One `--edit track:<id>` block for mkvpropedit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEdit {
    pub track_id: u64,
    /// `name=value` property assignments
    pub properties: Vec<String>,
}

impl TrackEdit {
    fn reset(track_id: u64) -> Self {
        Self {
            track_id,
            properties: vec!["flag-default=0".to_string(), "flag-forced=0".to_string()],
        }
    }

    fn make_default(track_id: u64, language: Option<&str>) -> Self {
        let mut properties = vec!["flag-default=1".to_string()];
        if let Some(language) = language {
            properties.push(format!("language={}", language));
        }
        Self {
            track_id,
            properties,
        }
    }

    /// mkvpropedit arguments following the file path
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["--edit".to_string(), format!("track:{}", self.track_id)];
        for property in &self.properties {
            args.push("--set".to_string());
            args.push(property.clone());
        }
        args
    }
}

/// Translate a selection into ordered edits.
///
/// Every subtitle track (and every audio track when audio is being changed)
/// has its default and forced flags cleared first; the chosen tracks are then
/// flagged default and stamped with their language. Audio is left alone when
/// `change_audio` is false.
pub fn plan_edits(inventory: &TrackInventory, selection: &TrackSelection) -> Vec<TrackEdit> {
    let mut edits = Vec::new();

    if selection.change_audio {
        edits.extend(inventory.of_kind(TrackKind::Audio).map(|t| TrackEdit::reset(t.id)));
    }
    edits.extend(inventory.of_kind(TrackKind::Subtitle).map(|t| TrackEdit::reset(t.id)));

    if selection.change_audio
        && let Some(id) = selection.audio_track_id
    {
        edits.push(TrackEdit::make_default(id, selection.audio_language.as_deref()));
    }
    if let Some(id) = selection.subtitle_track_id {
        edits.push(TrackEdit::make_default(id, selection.subtitle_language.as_deref()));
    }

    edits
}

/// Reads and rewrites container track flags
#[async_trait]
pub trait ContainerTool: Send + Sync {
    /// Read the track inventory of a file
    async fn inspect(&self, path: &Path) -> Result<TrackInventory>;

    /// Write a selection to a file
    async fn apply(
        &self,
        path: &Path,
        inventory: &TrackInventory,
        selection: &TrackSelection,
    ) -> Result<()>;
}

/// MKVToolNix-backed container tool
pub struct MkvToolnix {
    mkvmerge_path: String,
    mkvpropedit_path: String,
    dry_run: bool,
}

impl MkvToolnix {
    pub fn new() -> Self {
        Self {
            mkvmerge_path: "mkvmerge".to_string(),
            mkvpropedit_path: "mkvpropedit".to_string(),
            dry_run: false,
        }
    }

    /// Use custom executable paths
    pub fn with_paths(mkvmerge_path: String, mkvpropedit_path: String) -> Self {
        Self {
            mkvmerge_path,
            mkvpropedit_path,
            dry_run: false,
        }
    }

    /// Log edits instead of running them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check that both executables can be launched
    pub async fn is_available(&self) -> bool {
        for tool in [&self.mkvmerge_path, &self.mkvpropedit_path] {
            let ok = Command::new(tool)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map(|s| s.success())
                .unwrap_or(false);
            if !ok {
                return false;
            }
        }
        true
    }

    /// Run every edit in one mkvpropedit invocation so the file is written
    /// in a single pass
    async fn run_edits(&self, path: &Path, edits: &[TrackEdit]) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }

        let args: Vec<String> = edits.iter().flat_map(TrackEdit::args).collect();
        info!(
            path = %path.display(),
            edits = edits.len(),
            dry_run = self.dry_run,
            "Running: {} {} {}",
            self.mkvpropedit_path,
            path.display(),
            args.join(" ")
        );
        if self.dry_run {
            return Ok(());
        }

        let output = Command::new(&self.mkvpropedit_path)
            .arg(path)
            .args(&args)
            .output()
            .await
            .with_context(|| format!("Failed to execute mkvpropedit for '{}'", path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            // mkvpropedit reports most errors on stdout
            let detail = [stderr.trim(), stdout.trim()]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or("no error output");
            anyhow::bail!(
                "mkvpropedit failed for '{}' (exit code {}): {}",
                path.display(),
                exit_code(&output.status),
                detail
            );
        }
        Ok(())
    }
}

impl Default for MkvToolnix {
    fn default() -> Self {
        Self::new()
    }
}

fn exit_code(status: &std::process::ExitStatus) -> String {
    status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl ContainerTool for MkvToolnix {
    async fn inspect(&self, path: &Path) -> Result<TrackInventory> {
        debug!(path = %path.display(), "Identifying tracks with mkvmerge");

        if !path.exists() {
            anyhow::bail!("mkvmerge failed for '{}': file does not exist", path.display());
        }

        let output = Command::new(&self.mkvmerge_path)
            .arg("-J")
            .arg(path)
            .output()
            .await
            .with_context(|| format!("Failed to execute mkvmerge for '{}'", path.display()))?;

        // mkvmerge exits 1 for warnings and still prints valid JSON
        if !output.status.success() && output.status.code() != Some(1) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "mkvmerge failed for '{}' (exit code {}): {}",
                path.display(),
                exit_code(&output.status),
                if stderr.is_empty() {
                    "no error output"
                } else {
                    stderr.trim()
                }
            );
        }

        let inventory = parse_identification(&output.stdout)
            .with_context(|| format!("Invalid mkvmerge output for '{}'", path.display()))?;

        let classified = inventory.classify();
        debug!(
            path = %path.display(),
            audio_tracks = classified.audio.len(),
            subtitle_tracks = classified.subtitles.len(),
            "Track identification complete"
        );

        Ok(inventory)
    }

    async fn apply(
        &self,
        path: &Path,
        inventory: &TrackInventory,
        selection: &TrackSelection,
    ) -> Result<()> {
        self.run_edits(path, &plan_edits(inventory, selection)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const IDENTIFY_JSON: &str = r#"{
        "container": {"type": "Matroska", "recognized": true, "supported": true},
        "tracks": [
            {"id": 0, "type": "video", "codec": "HEVC", "properties": {"default_track": true, "language": "und"}},
            {"id": 1, "type": "audio", "codec": "FLAC", "properties": {"default_track": false, "language": "jpn", "track_name": "Japanese"}},
            {"id": 2, "type": "audio", "codec": "AAC", "properties": {"default_track": true, "language": "eng", "language_ietf": "en"}},
            {"id": 3, "type": "subtitles", "codec": "SubStationAlpha", "properties": {"default_track": true, "language": "eng", "track_name": "Signs & Songs", "forced_track": true}},
            {"id": 4, "type": "subtitles", "codec": "SubStationAlpha", "properties": {"default_track": false, "language": "und", "language_ietf": "en", "track_name": "Full"}},
            {"id": 5, "type": "subtitles", "properties": {}},
            {"type": "audio", "properties": {"language": "jpn"}}
        ]
    }"#;

    #[test]
    fn test_parse_identification() {
        let inventory = parse_identification(IDENTIFY_JSON.as_bytes()).unwrap();
        let tracks = inventory.tracks();

        assert_eq!(tracks.len(), 6);
        assert_eq!(tracks[0].kind, TrackKind::Other);
        assert_eq!(
            tracks[1],
            Track::audio(1).with_language("jpn").with_name("Japanese")
        );
        assert!(tracks[2].is_default);
        assert_eq!(tracks[2].language.as_deref(), Some("eng"));
        assert_eq!(tracks[3].kind, TrackKind::Subtitle);
        assert_eq!(tracks[3].name.as_deref(), Some("Signs & Songs"));
        // IETF tag fills in for "und"
        assert_eq!(tracks[4].language.as_deref(), Some("en"));
        assert_eq!(tracks[5], Track::subtitle(5));
    }

    #[test]
    fn test_parse_identification_without_tracks() {
        let inventory = parse_identification(br#"{"container": {}}"#).unwrap();
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_parse_identification_rejects_garbage() {
        assert!(parse_identification(b"not json").is_err());
    }

    #[test]
    fn test_plan_edits_changing_audio() {
        let inventory = parse_identification(IDENTIFY_JSON.as_bytes()).unwrap();
        let selection = TrackSelection {
            audio_track_id: Some(1),
            subtitle_track_id: Some(4),
            change_audio: true,
            audio_language: Some("jpn".to_string()),
            subtitle_language: Some("eng".to_string()),
        };

        let edits = plan_edits(&inventory, &selection);
        let order: Vec<u64> = edits.iter().map(|e| e.track_id).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 1, 4]);
        assert_eq!(
            edits[5].properties,
            vec!["flag-default=1".to_string(), "language=jpn".to_string()]
        );
        assert_eq!(
            edits[6].args(),
            vec!["--edit", "track:4", "--set", "flag-default=1", "--set", "language=eng"]
        );
    }

    #[test]
    fn test_plan_edits_leaves_audio_alone() {
        let inventory = parse_identification(IDENTIFY_JSON.as_bytes()).unwrap();
        let selection = TrackSelection {
            subtitle_track_id: Some(5),
            ..Default::default()
        };

        let edits = plan_edits(&inventory, &selection);
        let order: Vec<u64> = edits.iter().map(|e| e.track_id).collect();
        assert_eq!(order, vec![3, 4, 5, 5]);
        assert_eq!(
            edits[0].args(),
            vec!["--edit", "track:3", "--set", "flag-default=0", "--set", "flag-forced=0"]
        );
        assert_eq!(edits[3].properties, vec!["flag-default=1".to_string()]);
    }

    #[tokio::test]
    async fn test_dry_run_apply_runs_nothing() {
        let tool = MkvToolnix::with_paths(
            "/nonexistent/mkvmerge".to_string(),
            "/nonexistent/mkvpropedit".to_string(),
        )
        .dry_run(true);
        let inventory = parse_identification(IDENTIFY_JSON.as_bytes()).unwrap();
        let selection = TrackSelection {
            subtitle_track_id: Some(4),
            subtitle_language: Some("eng".to_string()),
            ..Default::default()
        };

        tool.apply(Path::new("/nonexistent/file.mkv"), &inventory, &selection)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_inspect_missing_file() {
        let tool = MkvToolnix::new();
        let err = tool
            .inspect(Path::new("/nonexistent/file.mkv"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    /// `sh` runs the target file as a script, so the script stands in for
    /// the Matroska file and records every invocation
    fn logging_target(dir: &Path, exit_code: i32) -> (std::path::PathBuf, std::path::PathBuf) {
        let log = dir.join("invocations.log");
        let script = dir.join("episode.mkv");
        std::fs::write(
            &script,
            format!(
                "echo \"$@\" >> '{}'\necho 'Error: write failed'\nexit {}\n",
                log.display(),
                exit_code
            ),
        )
        .unwrap();
        (script, log)
    }

    fn subtitle_swap() -> (TrackInventory, TrackSelection) {
        let inventory = TrackInventory::new(vec![
            Track::audio(0).with_language("jpn").with_default(true),
            Track::subtitle(1).with_language("eng").with_name("Signs").with_default(true),
            Track::subtitle(2).with_language("eng").with_name("Full"),
        ]);
        let selection = TrackSelection {
            subtitle_track_id: Some(2),
            subtitle_language: Some("eng".to_string()),
            ..Default::default()
        };
        (inventory, selection)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_apply_writes_all_edits_in_one_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let (target, log) = logging_target(dir.path(), 0);
        let tool = MkvToolnix::with_paths("mkvmerge".to_string(), "sh".to_string());
        let (inventory, selection) = subtitle_swap();

        tool.apply(&target, &inventory, &selection).await.unwrap();

        let invocations = std::fs::read_to_string(&log).unwrap();
        assert_eq!(
            invocations.lines().collect::<Vec<_>>(),
            vec![
                "--edit track:1 --set flag-default=0 --set flag-forced=0 \
                 --edit track:2 --set flag-default=0 --set flag-forced=0 \
                 --edit track:2 --set flag-default=1 --set language=eng"
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_apply_failure_runs_a_single_write() {
        let dir = tempfile::tempdir().unwrap();
        let (target, log) = logging_target(dir.path(), 2);
        let tool = MkvToolnix::with_paths("mkvmerge".to_string(), "sh".to_string());
        let (inventory, selection) = subtitle_swap();

        let err = tool.apply(&target, &inventory, &selection).await.unwrap_err();

        assert!(err.to_string().contains("(exit code 2): Error: write failed"));
        assert_eq!(std::fs::read_to_string(&log).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn test_apply_without_edits_runs_nothing() {
        let tool = MkvToolnix::with_paths(
            "/nonexistent/mkvmerge".to_string(),
            "/nonexistent/mkvpropedit".to_string(),
        );

        tool.apply(
            Path::new("/nonexistent/file.mkv"),
            &TrackInventory::default(),
            &TrackSelection::default(),
        )
        .await
        .unwrap();
    }
}
