use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::matcher::{MatchReason, Matcher};

/// Logical origin of a scan root. Also the top-level folder inside archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLabel {
    Workshop,
    Scenarios,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLabel::Workshop => "workshop",
            SourceLabel::Scenarios => "scenarios",
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRoot {
    pub path: PathBuf,
    pub label: SourceLabel,
}

/// How deep the walk goes below each root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// Every file below the root.
    #[default]
    Recursive,
    /// Files in the root and in its immediate subdirectories.
    Shallow,
}

impl Traversal {
    fn max_depth(self) -> usize {
        match self {
            Traversal::Recursive => usize::MAX,
            Traversal::Shallow => 2,
        }
    }
}

/// A scenario file that matched, with where it came from and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub file_path: PathBuf,
    pub display_name: String,
    pub source_label: SourceLabel,
    /// Path below the scan root the file was found under.
    pub relative_path: PathBuf,
    pub match_reasons: BTreeSet<MatchReason>,
}

impl MatchRecord {
    pub fn reasons_label(&self) -> String {
        self.match_reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    pub records: Vec<MatchRecord>,
    /// Files with the target extension that were evaluated.
    pub candidates_scanned: usize,
    pub roots_skipped: usize,
}

impl ScanReport {
    pub fn matches(&self) -> usize {
        self.records.len()
    }
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Walks every root and returns the matching files in traversal order
/// (entries sorted by file name within each directory).
///
/// Missing roots and unreadable directory entries are logged and skipped.
pub fn scan(
    roots: &[ScanRoot],
    extension: &str,
    traversal: Traversal,
    matcher: &Matcher,
) -> ScanReport {
    let mut report = ScanReport::default();

    for root in roots {
        if !root.path.is_dir() {
            if root.path.exists() {
                warn!(root = %root.path.display(), label = %root.label, "Scan root is not a directory, skipping");
            } else {
                warn!(root = %root.path.display(), label = %root.label, "Scan root not found, skipping");
            }
            report.roots_skipped += 1;
            continue;
        }

        info!(root = %root.path.display(), label = %root.label, ?traversal, "Scanning root");
        let before = report.records.len();

        for entry in WalkDir::new(&root.path)
            .min_depth(1)
            .max_depth(traversal.max_depth())
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.path.display(), error = %e, "Could not read directory entry, skipping");
                    continue;
                }
            };
            // File type comes from the walk itself; links are already resolved.
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !has_extension(path, extension) {
                continue;
            }

            report.candidates_scanned += 1;
            let result = matcher.evaluate(path);
            if !result.is_match {
                continue;
            }

            let display_name = entry.file_name().to_string_lossy().into_owned();
            let relative_path = path
                .strip_prefix(&root.path)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(&display_name));
            let record = MatchRecord {
                file_path: path.to_path_buf(),
                display_name,
                source_label: root.label,
                relative_path,
                match_reasons: result.reasons,
            };
            info!(file = %record.display_name, reasons = %record.reasons_label(), "Found tagged scenario");
            report.records.push(record);
        }

        debug!(
            root = %root.path.display(),
            matches = report.records.len() - before,
            "Finished scanning root"
        );
    }

    info!(
        candidates = report.candidates_scanned,
        matches = report.matches(),
        roots_skipped = report.roots_skipped,
        "Scan complete"
    );
    report
}
