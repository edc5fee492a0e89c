//! Application configuration management

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::torrent::PathMapping;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Sonarr base URL
    pub sonarr_url: String,

    /// Sonarr API key
    pub sonarr_api_key: String,

    /// Skip files the torrent client is seeding
    pub exclude_seeding: bool,

    /// Transmission RPC endpoint; seeding exclusion is disabled without it
    pub transmission_rpc_url: Option<String>,

    pub transmission_user: Option<String>,

    pub transmission_password: Option<String>,

    /// Rewrites Sonarr paths into Transmission's view for seed matching
    pub seed_path_mapping: Option<PathMapping>,

    /// Rewrites Sonarr paths into paths this process can open
    pub file_path_mapping: Option<PathMapping>,

    /// Log mkvpropedit commands without running them
    pub dry_run: bool,

    pub generate_reports: bool,

    pub report_directory: PathBuf,

    /// Hours between audit cycles, between 1 and a year
    pub poll_interval_hours: u64,

    /// Run a single cycle and exit
    pub run_once: bool,

    /// Per-request timeout for Sonarr and Transmission
    pub http_timeout_secs: u64,

    pub mkvmerge_path: String,

    pub mkvpropedit_path: String,
}

/// Upper bound for `POLL_INTERVAL_HOURS` (one year)
const MAX_POLL_INTERVAL_HOURS: u64 = 24 * 365;

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| var(key).map(|v| parse_bool(&v)).unwrap_or(default);
        let number = |key: &str, default: u64| {
            var(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            sonarr_url: var("SONARR_URL").unwrap_or_else(|| "http://sonarr:8989".to_string()),

            sonarr_api_key: var("SONARR_API_KEY").context("SONARR_API_KEY is required")?,

            exclude_seeding: flag("EXCLUDE_SEEDING", true),

            transmission_rpc_url: var("TRANSMISSION_RPC_URL"),

            transmission_user: var("TRANSMISSION_USER"),

            transmission_password: var("TRANSMISSION_PASSWORD"),

            seed_path_mapping: PathMapping::from_parts(var("PATH_MAP_FROM"), var("PATH_MAP_TO")),

            file_path_mapping: PathMapping::from_parts(
                var("FILE_PATH_MAP_FROM"),
                var("FILE_PATH_MAP_TO"),
            ),

            dry_run: flag("DRY_RUN", false),

            generate_reports: flag("GENERATE_REPORTS", true),

            report_directory: PathBuf::from(
                var("REPORT_DIRECTORY").unwrap_or_else(|| "/report".to_string()),
            ),

            poll_interval_hours: number("POLL_INTERVAL_HOURS", 24).clamp(1, MAX_POLL_INTERVAL_HOURS),

            run_once: flag("RUN_ONCE", false),

            http_timeout_secs: number("HTTP_TIMEOUT_SECS", 30),

            mkvmerge_path: var("MKVMERGE_PATH").unwrap_or_else(|| "mkvmerge".to_string()),

            mkvpropedit_path: var("MKVPROPEDIT_PATH").unwrap_or_else(|| "mkvpropedit".to_string()),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_hours.saturating_mul(60 * 60))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
