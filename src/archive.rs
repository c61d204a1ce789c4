//! Bundles matched scenario files into a single zip archive.
//!
//! Entries are stored at `<source label>/<path relative to that root>`. The
//! archive is written next to the other run artifacts and is left on disk
//! after upload.

use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::scanner::MatchRecord;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create archive {path:?}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not read {path:?} while building the archive: {source}")]
    MemberRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write archive entry {entry}: {source}")]
    Write { entry: String, source: ZipError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    pub path: PathBuf,
    pub file_name: String,
    pub entries: usize,
}

/// `<prefix>_<YYYYMMDD_HHMMSS>.zip`
pub fn archive_file_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{}_{}.zip", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Archive-internal path of a record, always `/`-separated.
pub fn entry_name(record: &MatchRecord) -> String {
    let mut parts = vec![record.source_label.as_str().to_string()];
    parts.extend(record.relative_path.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    }));
    parts.join("/")
}

/// Writes every record into a new archive under `output_dir`.
///
/// A member that cannot be read aborts the whole archive and the partial file
/// is removed. Records that map to an entry name already written are skipped.
pub fn build_archive(
    records: &[MatchRecord],
    output_dir: &Path,
    prefix: &str,
    timestamp: NaiveDateTime,
) -> Result<ArchiveResult, ArchiveError> {
    let file_name = archive_file_name(prefix, timestamp);
    let path = output_dir.join(&file_name);
    info!(archive = %path.display(), records = records.len(), "Creating archive");

    let file = File::create(&path).map_err(|e| {
        error!(archive = %path.display(), error = %e, "Failed to create archive file");
        ArchiveError::Create {
            path: path.clone(),
            source: e,
        }
    })?;

    match write_entries(ZipWriter::new(file), records) {
        Ok(entries) => {
            info!(archive = %path.display(), entries, "Archive written");
            Ok(ArchiveResult {
                path,
                file_name,
                entries,
            })
        }
        Err(e) => {
            error!(archive = %path.display(), error = %e, "Archive creation failed, removing partial file");
            if let Err(remove_err) = fs::remove_file(&path) {
                warn!(archive = %path.display(), error = %remove_err, "Could not remove partial archive");
            }
            Err(e)
        }
    }
}

fn write_entries(mut zip: ZipWriter<File>, records: &[MatchRecord]) -> Result<usize, ArchiveError> {
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut written: HashSet<String> = HashSet::new();

    for record in records {
        let entry = entry_name(record);
        if written.contains(&entry) {
            warn!(entry = %entry, file = %record.file_path.display(), "Duplicate archive entry, skipping");
            continue;
        }

        // Read before starting the entry so a failure never leaves a half-written member.
        let content = fs::read(&record.file_path).map_err(|e| ArchiveError::MemberRead {
            path: record.file_path.clone(),
            source: e,
        })?;

        zip.start_file(entry.clone(), options)
            .map_err(|e| ArchiveError::Write {
                entry: entry.clone(),
                source: e,
            })?;
        zip.write_all(&content).map_err(|e| ArchiveError::Write {
            entry: entry.clone(),
            source: ZipError::Io(e),
        })?;
        written.insert(entry);
    }

    zip.finish().map_err(|e| ArchiveError::Write {
        entry: "<central directory>".to_string(),
        source: e,
    })?;
    Ok(written.len())
}
