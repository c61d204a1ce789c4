//! High-level pipeline: orchestrates scan → (archive) → upload.
//!
//! # Responsibilities
//! - Builds the [`Matcher`] from config and scans every configured root
//! - Stops early (successfully) when nothing matched
//! - Individual mode: publishes each match under its file name and groups the outcomes
//! - Archive mode: bundles all matches into one zip and publishes that once
//!
//! # Error Handling
//! Upload problems never fail the pipeline; they end up in the report as
//! failed outcomes. Only an invalid match configuration or an archive that
//! cannot be built returns a [`PipelineError`].
//!
//! Everything runs sequentially: the scan finishes before the first upload and
//! each upload is awaited before the next one starts.

use chrono::Local;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::archive::{build_archive, ArchiveError, ArchiveResult};
use crate::config::{PipelineConfig, ScanConfig, UploadMode};
use crate::contract::{UploadOutcome, Uploader};
use crate::matcher::Matcher;
use crate::publish::upload_file;
use crate::report::UploadSummary;
use crate::scanner::{scan, ScanReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid tag field pattern: {0}")]
    Matcher(#[from] regex::Error),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

#[derive(Debug)]
pub enum PipelineReport {
    NoMatches {
        scan: ScanReport,
    },
    Individual {
        scan: ScanReport,
        summary: UploadSummary,
    },
    Archive {
        scan: ScanReport,
        archive: ArchiveResult,
        outcome: UploadOutcome,
    },
}

impl PipelineReport {
    pub fn scan(&self) -> &ScanReport {
        match self {
            PipelineReport::NoMatches { scan }
            | PipelineReport::Individual { scan, .. }
            | PipelineReport::Archive { scan, .. } => scan,
        }
    }
}

/// Scan only. Used for dry runs and as the first pipeline step.
pub fn scan_roots(config: &ScanConfig) -> Result<ScanReport, PipelineError> {
    let matcher = Matcher::from_config(config).map_err(|e| {
        error!(error = %e, tag_field = %config.tag_field, "[SYNC][ERROR] Could not build matcher");
        e
    })?;
    Ok(scan(
        &config.roots,
        &config.extension,
        config.traversal,
        &matcher,
    ))
}

pub async fn synchronise<U>(
    config: &PipelineConfig,
    uploader: &U,
) -> Result<PipelineReport, PipelineError>
where
    U: Uploader + ?Sized,
{
    info!("[SYNC] Starting scan");
    let scan = scan_roots(&config.scan)?;

    if scan.records.is_empty() {
        info!(candidates = scan.candidates_scanned, "[SYNC] No matching files, nothing to upload");
        return Ok(PipelineReport::NoMatches { scan });
    }

    let resolve_public_url = config.upload.resolve_public_url;
    match config.upload.mode {
        UploadMode::Individual => {
            info!(files = scan.records.len(), "[SYNC][UPLOAD] Uploading files individually");
            let mut summary = UploadSummary::default();
            for record in &scan.records {
                let outcome = upload_file(
                    uploader,
                    &record.display_name,
                    &record.file_path,
                    resolve_public_url,
                )
                .await;
                info!(object = %outcome.object_name, status = %outcome.status, "[SYNC][UPLOAD] File processed");
                match serde_json::to_string(&outcome) {
                    Ok(json) => debug!(json = %json, "[SYNC][UPLOAD][DEBUG] Upload outcome as JSON"),
                    Err(e) => error!(error = ?e, "[SYNC][UPLOAD][DEBUG] Failed to serialize upload outcome"),
                }
                summary.push(outcome);
            }
            Ok(PipelineReport::Individual { scan, summary })
        }
        UploadMode::Archive => {
            let archive = build_archive(
                &scan.records,
                &config.upload.archive_dir,
                &config.upload.archive_prefix,
                Local::now().naive_local(),
            )?;
            info!(archive = %archive.path.display(), entries = archive.entries, "[SYNC][UPLOAD] Uploading archive");
            let outcome = upload_file(
                uploader,
                &archive.file_name,
                &archive.path,
                resolve_public_url,
            )
            .await;
            info!(object = %outcome.object_name, status = %outcome.status, "[SYNC][UPLOAD] Archive processed");
            Ok(PipelineReport::Archive {
                scan,
                archive,
                outcome,
            })
        }
    }
}
