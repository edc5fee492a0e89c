//! Wiring collaborators from configuration.
//!
//! Used by [main] to build the [Auditor] the scheduler drives.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::jobs::{AuditSettings, Auditor};
use crate::services::{MkvToolnix, SeedSource, SonarrClient, TransmissionClient};
use crate::torrent::SeedMatchConfig;

/// Cycle settings derived from configuration
pub fn audit_settings(config: &Config) -> AuditSettings {
    AuditSettings {
        exclude_seeding: config.exclude_seeding && config.transmission_rpc_url.is_some(),
        seed_match: SeedMatchConfig {
            path_mapping: config.seed_path_mapping.clone(),
        },
        file_path_mapping: config.file_path_mapping.clone(),
        generate_reports: config.generate_reports,
        report_directory: config.report_directory.clone(),
    }
}

/// Build the auditor and its Sonarr, Transmission and MKVToolNix clients
pub async fn build_auditor(config: &Config) -> Result<Auditor> {
    let catalog = Arc::new(SonarrClient::new(
        &config.sonarr_url,
        config.sonarr_api_key.clone(),
        config.http_timeout(),
    )?);

    let seeds: Option<Arc<dyn SeedSource>> = match (&config.transmission_rpc_url, config.exclude_seeding) {
        (Some(url), true) => Some(Arc::new(TransmissionClient::new(
            url.clone(),
            config.transmission_user.clone(),
            config.transmission_password.clone(),
            config.http_timeout(),
        )?)),
        (None, true) => {
            warn!("EXCLUDE_SEEDING is set but TRANSMISSION_RPC_URL is not, seeding files will not be skipped");
            None
        }
        (_, false) => None,
    };

    let container = MkvToolnix::with_paths(
        config.mkvmerge_path.clone(),
        config.mkvpropedit_path.clone(),
    )
    .dry_run(config.dry_run);
    if !container.is_available().await {
        warn!(
            mkvmerge = %config.mkvmerge_path,
            mkvpropedit = %config.mkvpropedit_path,
            "MKVToolNix executables not found, every file will fail inspection"
        );
    }

    let settings = audit_settings(config);
    info!(
        sonarr = %config.sonarr_url,
        exclude_seeding = settings.exclude_seeding,
        dry_run = config.dry_run,
        generate_reports = settings.generate_reports,
        "Auditor configured"
    );

    Ok(Auditor::new(catalog, seeds, Arc::new(container), settings))
}
