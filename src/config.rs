use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::scanner::{ScanRoot, SourceLabel, Traversal};

pub const DEFAULT_WORKSHOP_ROOT: &str =
    r"C:\Program Files (x86)\Steam\steamapps\workshop\content\824270";
pub const DEFAULT_SCENARIOS_ROOT: &str = r"C:\Program Files (x86)\Steam\steamapps\common\FPSAimTrainer\FPSAimTrainer\Saved\SaveGames\Scenarios";
pub const DEFAULT_SUPPORT_CONTACT: &str = "the scenario-bucket maintainers";

/// Everything a run needs except the storage credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub scan: ScanConfig,
    pub upload: UploadConfig,
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            keyword = %self.scan.keyword,
            extension = %self.scan.extension,
            roots_count = self.scan.roots.len(),
            mode = ?self.upload.mode,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}

/// What to look for and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Substring that flags a file, compared case-insensitively.
    pub keyword: String,
    /// Scenario file extension without the leading dot.
    pub extension: String,
    /// Metadata field holding the searchable tags.
    pub tag_field: String,
    pub traversal: Traversal,
    pub roots: Vec<ScanRoot>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            keyword: "shim".to_string(),
            extension: "sce".to_string(),
            tag_field: "SearchTags".to_string(),
            traversal: Traversal::Recursive,
            roots: vec![
                ScanRoot {
                    path: PathBuf::from(DEFAULT_WORKSHOP_ROOT),
                    label: SourceLabel::Workshop,
                },
                ScanRoot {
                    path: PathBuf::from(DEFAULT_SCENARIOS_ROOT),
                    label: SourceLabel::Scenarios,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// One object per matching file, named after the file.
    #[default]
    Individual,
    /// A single zip archive holding every match.
    Archive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub mode: UploadMode,
    pub archive_prefix: String,
    /// Directory the archive is written to and left in.
    pub archive_dir: PathBuf,
    pub resolve_public_url: bool,
    /// Who users should contact when a run fails.
    pub support_contact: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            mode: UploadMode::Individual,
            archive_prefix: "shim_scenarios".to_string(),
            archive_dir: PathBuf::from("."),
            resolve_public_url: true,
            support_contact: DEFAULT_SUPPORT_CONTACT.to_string(),
        }
    }
}

/// Endpoint and credentials for the storage backend. Only ever read from the environment.
#[derive(Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: String,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_steam_roots() {
        let config = PipelineConfig::default();
        let labels: Vec<_> = config.scan.roots.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![SourceLabel::Workshop, SourceLabel::Scenarios]);
        assert_eq!(config.scan.keyword, "shim");
        assert_eq!(config.upload.mode, UploadMode::Individual);
    }

    #[test]
    fn storage_config_debug_hides_service_key() {
        let storage = StorageConfig {
            url: "https://example.supabase.co".into(),
            service_key: "super-secret".into(),
            bucket: "scenarios".into(),
        };
        let printed = format!("{storage:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("scenarios"));
    }
}
