//! Audit cycle
//!
//! One cycle lists every anime series in the catalog and walks its Matroska
//! episode files: seeding files are skipped, compliant files are left alone,
//! and everything else gets the selected default tracks written. A failure on
//! one file is recorded in its report and never stops the cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::media::{is_compliant, select_tracks};
use crate::services::{
    CatalogFile, CatalogSeries, CatalogSource, ContainerTool, FileReport, ReportPaths,
    ReportWriter, SeedSource, build_seed_index,
};
use crate::torrent::{PathMapping, SeedIndex, SeedMatchConfig, match_seeded};

/// Why processing a single file failed
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to inspect tracks: {0:#}")]
    Inspect(anyhow::Error),

    #[error("Failed to apply track changes: {0:#}")]
    Apply(anyhow::Error),
}

/// Cycle behaviour taken from configuration
#[derive(Debug, Clone)]
pub struct AuditSettings {
    pub exclude_seeding: bool,
    pub seed_match: SeedMatchConfig,
    /// Maps catalog paths onto paths readable by this process
    pub file_path_mapping: Option<PathMapping>,
    pub generate_reports: bool,
    pub report_directory: PathBuf,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            exclude_seeding: true,
            seed_match: SeedMatchConfig::default(),
            file_path_mapping: None,
            generate_reports: true,
            report_directory: PathBuf::from("/report"),
        }
    }
}

/// Counters and per-file outcomes of one cycle
#[derive(Debug, Default)]
pub struct CycleSummary {
    pub considered: usize,
    pub modified: usize,
    pub skipped_seeding: usize,
    pub already_compliant: usize,
    pub errors: usize,
    pub reports: Vec<FileReport>,
    pub report_paths: Option<ReportPaths>,
}

impl CycleSummary {
    fn record(&mut self, report: FileReport) {
        self.considered += 1;
        if report.was_modified {
            self.modified += 1;
        }
        if report.is_seeded {
            self.skipped_seeding += 1;
        }
        if report.was_compliant {
            self.already_compliant += 1;
        }
        if report.error_message.is_some() {
            self.errors += 1;
        }
        self.reports.push(report);
    }
}

/// Drives audit cycles against the catalog, torrent client and container tool
pub struct Auditor {
    catalog: Arc<dyn CatalogSource>,
    seeds: Option<Arc<dyn SeedSource>>,
    container: Arc<dyn ContainerTool>,
    settings: AuditSettings,
}

impl Auditor {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        seeds: Option<Arc<dyn SeedSource>>,
        container: Arc<dyn ContainerTool>,
        settings: AuditSettings,
    ) -> Self {
        Self {
            catalog,
            seeds,
            container,
            settings,
        }
    }

    pub fn settings(&self) -> &AuditSettings {
        &self.settings
    }

    /// Run one full cycle. Only a failure to list series aborts it.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        info!("Starting audit cycle");

        let seed_source = if self.settings.exclude_seeding {
            self.seeds.as_deref()
        } else {
            None
        };
        let index = build_seed_index(seed_source).await;

        let series = self
            .catalog
            .list_series()
            .await
            .context("Failed to list series from catalog")?;

        let mut summary = CycleSummary::default();
        for series in series.iter().filter(|s| s.is_anime) {
            let files = match self.catalog.list_episode_files(series).await {
                Ok(files) => files,
                Err(e) => {
                    error!(series = %series.title, error = %format!("{:#}", e), "Failed to list episode files");
                    continue;
                }
            };

            debug!(series = %series.title, files = files.len(), "Auditing series");
            for file in files.iter().filter(|f| f.is_matroska()) {
                let report = self.audit_file(series, file, &index).await;
                summary.record(report);
            }
        }

        if self.settings.generate_reports {
            let writer = ReportWriter::new(self.settings.report_directory.clone());
            match writer.write(&summary.reports).await {
                Ok(paths) => summary.report_paths = Some(paths),
                Err(e) => {
                    error!(
                        directory = %writer.directory().display(),
                        error = %format!("{:#}", e),
                        "Failed to write audit report"
                    );
                }
            }
        }

        info!(
            considered = summary.considered,
            modified = summary.modified,
            skipped_seeding = summary.skipped_seeding,
            already_compliant = summary.already_compliant,
            errors = summary.errors,
            "Audit cycle finished"
        );
        Ok(summary)
    }

    /// Path this process should open for a catalog path
    fn local_path(&self, catalog_path: &str) -> PathBuf {
        match &self.settings.file_path_mapping {
            Some(mapping) => PathBuf::from(mapping.apply(catalog_path)),
            None => PathBuf::from(catalog_path),
        }
    }

    async fn audit_file(
        &self,
        series: &CatalogSeries,
        file: &CatalogFile,
        index: &SeedIndex,
    ) -> FileReport {
        let report = FileReport::new(
            &file.path,
            &series.title,
            &file.episode_title,
            file.size_bytes,
        );

        if self.settings.exclude_seeding
            && let Some(seed_match) =
                match_seeded(&file.path, file.size_bytes, index, &self.settings.seed_match)
        {
            info!(path = %file.path, strategy = ?seed_match, "Skipping file that is seeding");
            return report.seeded(seed_match);
        }

        let local = self.local_path(&file.path);
        match self.process_file(&local, report.clone()).await {
            Ok(report) => report,
            Err(e) => {
                error!(path = %local.display(), error = %e, "Failed to process file");
                report.failed(e.to_string())
            }
        }
    }

    async fn process_file(&self, path: &Path, report: FileReport) -> Result<FileReport, FileError> {
        let inventory = self
            .container
            .inspect(path)
            .await
            .map_err(FileError::Inspect)?;
        let report = report.with_inventory(&inventory);

        if is_compliant(&inventory) {
            debug!(path = %path.display(), "File already compliant");
            return Ok(report.compliant());
        }

        let selection = select_tracks(&inventory);
        if selection.is_noop() {
            debug!(path = %path.display(), "No suitable tracks found");
            return Ok(report.no_suitable_tracks());
        }

        self.container
            .apply(path, &inventory, &selection)
            .await
            .map_err(FileError::Apply)?;

        let projected = is_compliant(&inventory.with_selection_applied(&selection));
        info!(
            path = %path.display(),
            audio_track_id = ?selection.audio_track_id,
            subtitle_track_id = ?selection.subtitle_track_id,
            change_audio = selection.change_audio,
            projected_compliant = projected,
            "Updated default tracks"
        );
        Ok(report.modified(&selection, projected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use crate::media::{Track, TrackInventory, TrackSelection};
    use crate::services::SkipReason;
    use crate::torrent::SeedMatch;

    struct FakeCatalog {
        series: Vec<CatalogSeries>,
        files: HashMap<i64, Vec<CatalogFile>>,
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn list_series(&self) -> Result<Vec<CatalogSeries>> {
            Ok(self.series.clone())
        }

        async fn list_episode_files(&self, series: &CatalogSeries) -> Result<Vec<CatalogFile>> {
            match self.files.get(&series.id) {
                Some(files) => Ok(files.clone()),
                None => anyhow::bail!("series {} not found", series.id),
            }
        }
    }

    struct FakeSeeds(SeedIndex);

    #[async_trait]
    impl SeedSource for FakeSeeds {
        async fn seed_index(&self) -> Result<SeedIndex> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct FakeContainer {
        inventories: HashMap<PathBuf, TrackInventory>,
        fail_apply: bool,
        applied: Mutex<Vec<(PathBuf, TrackSelection)>>,
    }

    #[async_trait]
    impl ContainerTool for FakeContainer {
        async fn inspect(&self, path: &Path) -> Result<TrackInventory> {
            self.inventories
                .get(path)
                .cloned()
                .with_context(|| format!("mkvmerge failed for '{}'", path.display()))
        }

        async fn apply(
            &self,
            path: &Path,
            _inventory: &TrackInventory,
            selection: &TrackSelection,
        ) -> Result<()> {
            if self.fail_apply {
                anyhow::bail!("mkvpropedit failed for '{}' (exit code 2)", path.display());
            }
            self.applied.lock().push((path.to_path_buf(), selection.clone()));
            Ok(())
        }
    }

    fn file(path: &str, size: Option<u64>) -> CatalogFile {
        CatalogFile {
            path: path.to_string(),
            size_bytes: size,
            episode_title: "Episode".to_string(),
        }
    }

    fn anime(id: i64, title: &str) -> CatalogSeries {
        CatalogSeries {
            id,
            title: title.to_string(),
            is_anime: true,
        }
    }

    fn compliant_inventory() -> TrackInventory {
        TrackInventory::new(vec![
            Track::audio(1).with_language("jpn").with_default(true),
            Track::subtitle(2).with_language("eng").with_default(true),
        ])
    }

    fn fixable_inventory() -> TrackInventory {
        TrackInventory::new(vec![
            Track::audio(1).with_language("eng").with_default(true),
            Track::audio(2).with_language("jpn"),
            Track::subtitle(3).with_language("eng").with_name("Signs & Songs"),
            Track::subtitle(4).with_language("eng").with_name("Full Subtitles"),
        ])
    }

    fn settings() -> AuditSettings {
        AuditSettings {
            generate_reports: false,
            ..AuditSettings::default()
        }
    }

    #[tokio::test]
    async fn test_cycle_outcomes() {
        let catalog = FakeCatalog {
            series: vec![
                anime(1, "Frieren"),
                CatalogSeries {
                    id: 2,
                    title: "Severance".to_string(),
                    is_anime: false,
                },
            ],
            files: HashMap::from([
                (
                    1,
                    vec![
                        file("/tv/Frieren/01.mkv", Some(10)),
                        file("/tv/Frieren/02.mkv", Some(20)),
                        file("/tv/Frieren/03.mkv", Some(30)),
                        file("/tv/Frieren/04.mkv", Some(40)),
                        file("/tv/Frieren/05.mp4", Some(50)),
                    ],
                ),
                (2, vec![file("/tv/Severance/01.mkv", Some(60))]),
            ]),
        };

        let mut index = SeedIndex::new();
        index.add_file("/downloads", "Frieren/01.mkv", 10);

        let container = FakeContainer {
            inventories: HashMap::from([
                (PathBuf::from("/tv/Frieren/02.mkv"), compliant_inventory()),
                (PathBuf::from("/tv/Frieren/03.mkv"), fixable_inventory()),
            ]),
            ..FakeContainer::default()
        };
        let container = Arc::new(container);

        let auditor = Auditor::new(
            Arc::new(catalog),
            Some(Arc::new(FakeSeeds(index))),
            container.clone(),
            settings(),
        );
        let summary = auditor.run_cycle().await.unwrap();

        assert_eq!(summary.considered, 4);
        assert_eq!(summary.skipped_seeding, 1);
        assert_eq!(summary.already_compliant, 1);
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.errors, 1);
        assert!(summary.report_paths.is_none());

        let reasons: Vec<Option<SkipReason>> =
            summary.reports.iter().map(|r| r.skip_reason).collect();
        assert_eq!(
            reasons,
            vec![
                Some(SkipReason::Seeding),
                Some(SkipReason::AlreadyCompliant),
                None,
                Some(SkipReason::ProcessingError),
            ]
        );
        assert_matches!(summary.reports[0].seed_match, Some(SeedMatch::Suffix));

        let modified = &summary.reports[2];
        assert_eq!(modified.selected_audio_track, Some(2));
        assert_eq!(modified.selected_subtitle_track, Some(4));
        assert_eq!(modified.projected_compliant, Some(true));

        let applied = container.applied.lock();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].0, PathBuf::from("/tv/Frieren/03.mkv"));
        assert!(applied[0].1.change_audio);

        assert!(
            summary.reports[3]
                .error_message
                .as_deref()
                .unwrap()
                .starts_with("Failed to inspect tracks")
        );
    }

    #[tokio::test]
    async fn test_seeding_check_disabled() {
        let catalog = FakeCatalog {
            series: vec![anime(1, "Frieren")],
            files: HashMap::from([(1, vec![file("/tv/Frieren/01.mkv", Some(10))])]),
        };
        let mut index = SeedIndex::new();
        index.add_path("/tv/Frieren/01.mkv");
        let container = FakeContainer {
            inventories: HashMap::from([(PathBuf::from("/tv/Frieren/01.mkv"), compliant_inventory())]),
            ..FakeContainer::default()
        };

        let auditor = Auditor::new(
            Arc::new(catalog),
            Some(Arc::new(FakeSeeds(index))),
            Arc::new(container),
            AuditSettings {
                exclude_seeding: false,
                ..settings()
            },
        );
        let summary = auditor.run_cycle().await.unwrap();

        assert_eq!(summary.skipped_seeding, 0);
        assert_eq!(summary.already_compliant, 1);
    }

    #[tokio::test]
    async fn test_series_listing_failure_skips_only_that_series() {
        let catalog = FakeCatalog {
            series: vec![anime(1, "Missing"), anime(2, "Present")],
            files: HashMap::from([(2, vec![file("/tv/Present/01.mkv", None)])]),
        };
        let container = FakeContainer {
            inventories: HashMap::from([(PathBuf::from("/tv/Present/01.mkv"), compliant_inventory())]),
            ..FakeContainer::default()
        };

        let auditor = Auditor::new(Arc::new(catalog), None, Arc::new(container), settings());
        let summary = auditor.run_cycle().await.unwrap();

        assert_eq!(summary.considered, 1);
        assert_eq!(summary.reports[0].series_title, "Present");
    }

    #[tokio::test]
    async fn test_apply_failure_and_no_suitable_tracks() {
        let catalog = FakeCatalog {
            series: vec![anime(1, "Show")],
            files: HashMap::from([(
                1,
                vec![file("/data/Show/01.mkv", None), file("/data/Show/02.mkv", None)],
            )]),
        };
        let audio_only = TrackInventory::new(vec![Track::audio(0).with_language("eng")]);
        let container = FakeContainer {
            inventories: HashMap::from([
                (PathBuf::from("/media/Show/01.mkv"), fixable_inventory()),
                (PathBuf::from("/media/Show/02.mkv"), audio_only),
            ]),
            fail_apply: true,
            ..FakeContainer::default()
        };

        let auditor = Auditor::new(
            Arc::new(catalog),
            None,
            Arc::new(container),
            AuditSettings {
                file_path_mapping: Some(PathMapping::new("/data", "/media")),
                ..settings()
            },
        );
        let summary = auditor.run_cycle().await.unwrap();

        assert_eq!(summary.errors, 1);
        let failed = &summary.reports[0];
        assert_eq!(failed.file_path, "/data/Show/01.mkv");
        assert!(!failed.was_modified);
        assert!(
            failed
                .error_message
                .as_deref()
                .unwrap()
                .contains("mkvpropedit failed")
        );
        assert_eq!(summary.reports[1].skip_reason, Some(SkipReason::NoSuitableTracks));
    }

    #[tokio::test]
    async fn test_cycle_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FakeCatalog {
            series: vec![anime(1, "Show")],
            files: HashMap::from([(1, vec![file("/tv/Show/01.mkv", None)])]),
        };
        let container = FakeContainer {
            inventories: HashMap::from([(PathBuf::from("/tv/Show/01.mkv"), compliant_inventory())]),
            ..FakeContainer::default()
        };

        let auditor = Auditor::new(
            Arc::new(catalog),
            None,
            Arc::new(container),
            AuditSettings {
                report_directory: dir.path().to_path_buf(),
                ..AuditSettings::default()
            },
        );
        let summary = auditor.run_cycle().await.unwrap();

        let paths = summary.report_paths.unwrap();
        assert!(paths.json.exists());
        assert!(paths.summary.exists());
    }

    #[tokio::test]
    async fn test_report_write_failure_does_not_fail_cycle() {
        // A regular file where the report directory should be
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let catalog = FakeCatalog {
            series: vec![anime(1, "Show")],
            files: HashMap::from([(1, vec![file("/tv/Show/01.mkv", None)])]),
        };
        let container = FakeContainer {
            inventories: HashMap::from([(PathBuf::from("/tv/Show/01.mkv"), fixable_inventory())]),
            ..FakeContainer::default()
        };

        let auditor = Auditor::new(
            Arc::new(catalog),
            None,
            Arc::new(container),
            AuditSettings {
                report_directory: blocker.path().to_path_buf(),
                ..AuditSettings::default()
            },
        );
        let summary = auditor.run_cycle().await.unwrap();

        assert!(summary.report_paths.is_none());
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.errors, 0);
    }

    #[test]
    fn test_file_error_messages() {
        let err = FileError::Apply(anyhow::anyhow!("exit code 2").context("mkvpropedit failed"));
        assert_eq!(
            err.to_string(),
            "Failed to apply track changes: mkvpropedit failed: exit code 2"
        );
    }
}
