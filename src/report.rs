//! Console rendering of scan results and upload summaries.

use std::io::{self, Write};

use crate::contract::{UploadOutcome, UploadStatus};
use crate::scanner::ScanReport;
use crate::synchronise::PipelineReport;

pub const RULE_WIDTH: usize = 60;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Outcomes grouped by status, each bucket in upload order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: Vec<UploadOutcome>,
    pub already_exists: Vec<UploadOutcome>,
    pub failed: Vec<UploadOutcome>,
}

impl UploadSummary {
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = UploadOutcome>,
    {
        let mut summary = UploadSummary::default();
        for outcome in outcomes {
            summary.push(outcome);
        }
        summary
    }

    pub fn push(&mut self, outcome: UploadOutcome) {
        match outcome.status {
            UploadStatus::Uploaded => self.uploaded.push(outcome),
            UploadStatus::AlreadyExists => self.already_exists.push(outcome),
            UploadStatus::Failed => self.failed.push(outcome),
        }
    }

    pub fn total(&self) -> usize {
        self.uploaded.len() + self.already_exists.len() + self.failed.len()
    }
}

/// One `Found:` line per match with the reasons it matched.
pub fn write_found<W: Write>(out: &mut W, scan: &ScanReport, keyword: &str) -> io::Result<()> {
    for record in &scan.records {
        writeln!(
            out,
            "   Found: {} [{}] ({} in: {})",
            record.display_name,
            record.source_label,
            keyword,
            record.reasons_label()
        )?;
    }
    Ok(())
}

/// Lists every match followed by the scan totals.
pub fn write_matches<W: Write>(
    out: &mut W,
    scan: &ScanReport,
    keyword: &str,
    extension: &str,
) -> io::Result<()> {
    write_found(out, scan, keyword)?;
    write_scan_totals(out, scan, keyword, extension)
}

pub fn write_scan_totals<W: Write>(
    out: &mut W,
    scan: &ScanReport,
    keyword: &str,
    extension: &str,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Total .{} files found: {}", extension, scan.candidates_scanned)?;
    writeln!(out, "Files with '{}' found: {}", keyword, scan.matches())?;
    if scan.roots_skipped > 0 {
        writeln!(out, "Folders not found and skipped: {}", scan.roots_skipped)?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, summary: &UploadSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "UPLOAD SUMMARY")?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "Successfully uploaded: {}", summary.uploaded.len())?;
    for outcome in &summary.uploaded {
        writeln!(out, "    • {}", outcome.object_name)?;
    }
    writeln!(out)?;
    writeln!(out, "Already existed: {}", summary.already_exists.len())?;
    for outcome in &summary.already_exists {
        writeln!(out, "    • {}", outcome.object_name)?;
    }
    writeln!(out)?;
    writeln!(out, "Failed to upload: {}", summary.failed.len())?;
    for outcome in &summary.failed {
        match &outcome.error_detail {
            Some(detail) => writeln!(out, "    • {} ({})", outcome.object_name, detail)?,
            None => writeln!(out, "    • {}", outcome.object_name)?,
        }
    }
    Ok(())
}

pub fn write_report<W: Write>(
    out: &mut W,
    report: &PipelineReport,
    keyword: &str,
    extension: &str,
) -> io::Result<()> {
    write_matches(out, report.scan(), keyword, extension)?;
    match report {
        PipelineReport::NoMatches { .. } => {
            writeln!(out)?;
            writeln!(out, "No .{} files with '{}' found!", extension, keyword)?;
        }
        PipelineReport::Individual { summary, .. } => {
            write_summary(out, summary)?;
        }
        PipelineReport::Archive {
            archive, outcome, ..
        } => {
            writeln!(out)?;
            writeln!(out, "ARCHIVE UPLOAD")?;
            writeln!(out, "{}", rule())?;
            writeln!(
                out,
                "Archive: {} ({} files)",
                archive.path.display(),
                archive.entries
            )?;
            match outcome.status {
                UploadStatus::Uploaded => writeln!(out, "Uploaded as {}", outcome.object_name)?,
                UploadStatus::AlreadyExists => writeln!(
                    out,
                    "{} already exists in the bucket, nothing uploaded",
                    outcome.object_name
                )?,
                UploadStatus::Failed => writeln!(
                    out,
                    "Failed to upload {}: {}",
                    outcome.object_name,
                    outcome.error_detail.as_deref().unwrap_or("unknown error")
                )?,
            }
            if let Some(url) = &outcome.public_url {
                writeln!(out, "Public URL: {}", url)?;
            }
        }
    }
    Ok(())
}
