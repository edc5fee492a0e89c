//! Seeded-file detection
//!
//! Files that belong to a torrent in a seeding state must not be edited, or the
//! torrent's piece hashes stop matching. The catalog and the torrent client
//! rarely agree on paths (different container mounts, hardlinks into the
//! library), so a catalog file is matched against the client's view three ways:
//! exact path, basename suffix, and basename plus size.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Normalize a path to a slash-separated form.
///
/// Backslashes become slashes, repeated separators collapse, `.` segments are
/// dropped, and a trailing separator is removed (the root stays `/`).
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let segments: Vec<&str> = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Final path segment of an already-normalized path
fn basename(normalized: &str) -> &str {
    normalized.rsplit('/').next().unwrap_or(normalized)
}

/// Prefix rewrite between two views of the same filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    pub from: String,
    pub to: String,
}

impl PathMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Build a mapping only when both sides are present and non-empty
    pub fn from_parts(from: Option<String>, to: Option<String>) -> Option<Self> {
        match (from, to) {
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => {
                Some(Self::new(from, to))
            }
            _ => None,
        }
    }

    /// Rewrite `path` when it starts with the `from` prefix, then normalize.
    /// Paths outside the prefix are returned unchanged.
    pub fn apply(&self, path: &str) -> String {
        match path.strip_prefix(self.from.as_str()) {
            Some(rest) => normalize_path(&format!("{}{}", self.to, rest)),
            None => path.to_string(),
        }
    }
}

/// Options for seeded-file matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMatchConfig {
    /// Maps catalog paths onto the torrent client's paths
    pub path_mapping: Option<PathMapping>,
}

/// Files currently seeding, as reported by the torrent client.
///
/// Built once per audit cycle and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedIndex {
    paths: HashSet<String>,
    name_sizes: HashSet<(String, u64)>,
}

impl SeedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one seeding file from its torrent's download directory and the
    /// file's path inside the torrent
    pub fn add_file(&mut self, download_dir: &str, relative_path: &str, size: u64) {
        let absolute = Path::new(download_dir).join(relative_path);
        self.paths
            .insert(normalize_path(&absolute.to_string_lossy()));

        let name = Path::new(relative_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.name_sizes.insert((name, size));
    }

    /// Record an absolute path without a name/size entry
    pub fn add_path(&mut self, path: &str) {
        self.paths.insert(normalize_path(path));
    }

    /// Record a (basename, size) pair without a path entry
    pub fn add_name_size(&mut self, name: &str, size: u64) {
        self.name_sizes.insert((name.to_lowercase(), size));
    }

    pub fn contains_path(&self, normalized: &str) -> bool {
        self.paths.contains(normalized)
    }

    pub fn contains_name_size(&self, name: &str, size: u64) -> bool {
        self.name_sizes.contains(&(name.to_lowercase(), size))
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn name_size_count(&self) -> usize {
        self.name_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.name_sizes.is_empty()
    }
}

/// Which strategy matched a catalog file to a seeding file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMatch {
    /// Normalized (and mapped) path is in the index
    ExactPath,
    /// Some indexed path ends with the file's basename
    Suffix,
    /// Lowercased basename and byte size are in the index
    NameAndSize,
}

/// Find how, if at all, a catalog file matches a seeding file.
///
/// Strategies are tried in order and the first hit is returned. The name/size
/// check runs even when the index has no paths.
pub fn match_seeded(
    catalog_path: &str,
    size_bytes: Option<u64>,
    index: &SeedIndex,
    config: &SeedMatchConfig,
) -> Option<SeedMatch> {
    let mut normalized = normalize_path(catalog_path);
    if let Some(mapping) = &config.path_mapping {
        normalized = mapping.apply(&normalized);
    }

    if index.contains_path(&normalized) {
        return Some(SeedMatch::ExactPath);
    }

    let tail = basename(&normalized);
    // An empty basename would suffix-match every indexed path
    if !tail.is_empty() && tail != "/" && index.paths.iter().any(|p| p.ends_with(tail)) {
        return Some(SeedMatch::Suffix);
    }

    if let Some(size) = size_bytes
        && index.contains_name_size(tail, size)
    {
        return Some(SeedMatch::NameAndSize);
    }

    None
}

/// Whether a catalog file is currently seeding
pub fn is_seeded(
    catalog_path: &str,
    size_bytes: Option<u64>,
    index: &SeedIndex,
    config: &SeedMatchConfig,
) -> bool {
    match_seeded(catalog_path, size_bytes, index, config).is_some()
}
