//! Sonarr API client for the episode catalog
//!
//! Only two endpoints are needed: the series list and the per-series episode
//! list with embedded episode files.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Series type Sonarr assigns to anime
pub const ANIME_SERIES_TYPE: &str = "anime";

/// Series record from `/api/v3/series`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeries {
    pub id: i64,
    pub title: String,
    pub series_type: Option<String>,
}

/// Episode record from `/api/v3/episode`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrEpisode {
    pub id: i64,
    pub title: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub has_file: Option<bool>,
    pub episode_file: Option<SonarrEpisodeFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrEpisodeFile {
    pub id: Option<i64>,
    pub path: Option<String>,
    pub size: Option<u64>,
}

/// A series as the audit sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSeries {
    pub id: i64,
    pub title: String,
    pub is_anime: bool,
}

impl From<SonarrSeries> for CatalogSeries {
    fn from(series: SonarrSeries) -> Self {
        Self {
            id: series.id,
            title: series.title,
            is_anime: series.series_type.as_deref() == Some(ANIME_SERIES_TYPE),
        }
    }
}

/// An episode file as the audit sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    pub path: String,
    pub size_bytes: Option<u64>,
    pub episode_title: String,
}

impl CatalogFile {
    /// Only Matroska files can be edited in place
    pub fn is_matroska(&self) -> bool {
        self.path.to_lowercase().ends_with(".mkv")
    }
}

/// Episode files of a series; episodes without a file are dropped
pub fn episode_files(episodes: Vec<SonarrEpisode>) -> Vec<CatalogFile> {
    episodes
        .into_iter()
        .filter_map(|episode| {
            let file = episode.episode_file?;
            let path = file.path.filter(|p| !p.is_empty())?;
            Some(CatalogFile {
                path,
                size_bytes: file.size,
                episode_title: episode.title.unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .collect()
}

/// Source of series and episode files to audit
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_series(&self) -> Result<Vec<CatalogSeries>>;

    async fn list_episode_files(&self, series: &CatalogSeries) -> Result<Vec<CatalogFile>>;
}

/// Sonarr v3 API client
pub struct SonarrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SonarrClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Sonarr HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Get all series
    pub async fn get_series(&self) -> Result<Vec<SonarrSeries>> {
        let url = format!("{}/api/v3/series", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .context("Failed to fetch series from Sonarr")?;

        if !response.status().is_success() {
            anyhow::bail!("Sonarr series request failed with status: {}", response.status());
        }

        let series: Vec<SonarrSeries> = response
            .json()
            .await
            .context("Failed to parse Sonarr series")?;

        debug!(count = series.len(), "Sonarr returned series");
        Ok(series)
    }

    /// Get episodes of a series with their episode files
    pub async fn get_episodes(&self, series_id: i64) -> Result<Vec<SonarrEpisode>> {
        let url = format!("{}/api/v3/episode", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("seriesId", series_id.to_string()),
                ("includeEpisodeFile", "true".to_string()),
            ])
            .send()
            .await
            .context("Failed to fetch episodes from Sonarr")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Sonarr episode request for series {} failed with status: {}",
                series_id,
                response.status()
            );
        }

        let episodes: Vec<SonarrEpisode> = response
            .json()
            .await
            .context("Failed to parse Sonarr episodes")?;

        Ok(episodes)
    }
}

#[async_trait]
impl CatalogSource for SonarrClient {
    async fn list_series(&self) -> Result<Vec<CatalogSeries>> {
        let series: Vec<CatalogSeries> = self
            .get_series()
            .await?
            .into_iter()
            .map(CatalogSeries::from)
            .collect();
        info!(
            total = series.len(),
            anime = series.iter().filter(|s| s.is_anime).count(),
            "Loaded series from Sonarr"
        );
        Ok(series)
    }

    async fn list_episode_files(&self, series: &CatalogSeries) -> Result<Vec<CatalogFile>> {
        let episodes = self.get_episodes(series.id).await?;
        Ok(episode_files(episodes))
    }
}
