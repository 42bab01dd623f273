//! Discovery of DESeq2 result files and their display names
//!
//! Result files live under `<root>/primary/*.tsv` and `<root>/secondary/*.tsv`.
//! The catalog is scanned once at startup and not refreshed afterwards.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// File extension of DESeq2 result tables
pub const RESULTS_EXTENSION: &str = "tsv";

/// Longest display name before truncation
const MAX_DISPLAY_LEN: usize = 55;
/// Longest dropdown label body before truncation
const MAX_OPTION_LEN: usize = 45;

/// Which subdirectory a comparison came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Primary,
    Secondary,
}

impl Category {
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Primary => "primary",
            Category::Secondary => "secondary",
        }
    }

    /// One-letter tag shown in dropdowns
    pub fn abbrev(self) -> &'static str {
        match self {
            Category::Primary => "P",
            Category::Secondary => "S",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A discovered comparison file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub category: Category,
    pub display_name: String,
}

impl CatalogEntry {
    /// Path as the string key used by the loader and the web API
    pub fn key(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Resolve the results root for an application directory.
///
/// Prefers the deployed layout `<app_dir>/data/deseq2_results`, falling back
/// to the development layout `<app_dir>/../analysis_results/deseq2_results`.
pub fn resolve_results_dir(app_dir: &Path) -> PathBuf {
    let deployed = app_dir.join("data").join("deseq2_results");
    if deployed.exists() {
        return deployed;
    }
    let parent = app_dir.parent().unwrap_or(app_dir);
    parent.join("analysis_results").join("deseq2_results")
}

/// Scan the primary then secondary subdirectories of `root`
pub fn discover(root: &Path) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    for category in [Category::Primary, Category::Secondary] {
        let dir = root.join(category.dir_name());
        let found = scan_dir(&dir);
        log::info!("Found {} {} comparisons in {}", found.len(), category, dir.display());
        entries.extend(found.into_iter().map(|path| CatalogEntry {
            display_name: display_name(&path),
            path,
            category,
        }));
    }
    entries
}

fn scan_dir(dir: &Path) -> Vec<PathBuf> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(_) => return Vec::new(),
    };

    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(|entry| match entry {
            Ok(e) => Some(e.path()),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == RESULTS_EXTENSION))
        .collect();

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    paths
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Keep the first `keep` characters and append an ellipsis when `s` is longer than `max`
fn truncate_chars(s: &str, max: usize, keep: usize) -> String {
    if s.chars().count() > max {
        let mut out: String = s.chars().take(keep).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

/// Human-readable label for a result file stem.
///
/// `20240101_treated_vs_control_results` becomes `2024-01-01: treated vs control`.
pub fn label_for_stem(stem: &str) -> String {
    let name = stem.strip_suffix("_results").unwrap_or(stem);

    let (date, rest) = match name.split_once('_') {
        Some((prefix, rest)) if prefix.len() == 8 && prefix.bytes().all(|b| b.is_ascii_digit()) => {
            (Some(format!("{}-{}-{}", &prefix[..4], &prefix[4..6], &prefix[6..])), rest)
        }
        _ => (None, name),
    };

    let body = rest.replace("_vs_", " vs ").replace('_', " ");
    let label = match date {
        Some(date) => format!("{}: {}", date, body),
        None => body,
    };

    truncate_chars(&label, MAX_DISPLAY_LEN, MAX_DISPLAY_LEN - 3)
}

/// Display name for a result file path
pub fn display_name<P: AsRef<Path>>(path: P) -> String {
    label_for_stem(&file_stem(path.as_ref()))
}

/// Compact name used in plot titles, axis labels and export categories.
///
/// For `<prefix>_<name>_results` stems this is `<name>`; other stems are returned unchanged.
pub fn short_name<P: AsRef<Path>>(path: P) -> String {
    let stem = file_stem(path.as_ref());
    if stem.contains("_results") {
        if let Some((_, rest)) = stem.split_once('_') {
            return rest.replace("_results", "");
        }
    }
    stem
}

/// Dropdown label, e.g. `[P] 2024-01-01: treated vs control`
pub fn option_label(entry: &CatalogEntry) -> String {
    format!(
        "[{}] {}",
        entry.category.abbrev(),
        truncate_chars(&entry.display_name, MAX_OPTION_LEN, MAX_OPTION_LEN - 3)
    )
}
