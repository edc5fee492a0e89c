//! External service integrations

pub mod mkvtoolnix;
pub mod reporting;
pub mod sonarr;
pub mod transmission;

pub use mkvtoolnix::{ContainerTool, MkvToolnix, TrackEdit, parse_identification, plan_edits};
pub use reporting::{FileReport, LanguageAnalysis, ReportPaths, ReportWriter, SkipReason};
pub use sonarr::{CatalogFile, CatalogSeries, CatalogSource, SonarrClient};
pub use transmission::{SeedSource, TransmissionClient, build_seed_index};
