//! Duplicate-aware publishing on top of any [`Uploader`].
//!
//! These functions never return errors: every path ends in an [`UploadOutcome`].

use std::path::Path;
use tracing::{error, info, warn};

use crate::contract::{UploadOutcome, Uploader};

/// Whether an object with exactly this name is already in the bucket.
///
/// A failed listing counts as "not present" so the upload is still attempted.
pub async fn object_exists<U>(uploader: &U, name: &str) -> bool
where
    U: Uploader + ?Sized,
{
    match uploader.list_objects(name).await {
        Ok(objects) => objects.iter().any(|object| object.name == name),
        Err(e) => {
            warn!(object = %name, error = %e, "Could not check bucket for existing object, assuming absent");
            false
        }
    }
}

/// Uploads `content` as `name` unless an object with that name already exists.
pub async fn upload_object<U>(
    uploader: &U,
    name: &str,
    content: Vec<u8>,
    resolve_public_url: bool,
) -> UploadOutcome
where
    U: Uploader + ?Sized,
{
    if object_exists(uploader, name).await {
        info!(object = %name, "Object already exists in bucket, skipping upload");
        return UploadOutcome::already_exists(name);
    }

    let size = content.len();
    match uploader.upload_object(name, content).await {
        Ok(()) => {
            let public_url = if resolve_public_url {
                uploader.public_url(name)
            } else {
                None
            };
            info!(object = %name, size, public_url = ?public_url, "Uploaded object");
            UploadOutcome::uploaded(name, public_url)
        }
        Err(e) => {
            error!(object = %name, error = %e, "Upload failed");
            UploadOutcome::failed(name, e.to_string())
        }
    }
}

/// Reads `path` and uploads it as `name`. A read failure is reported as a failed outcome.
pub async fn upload_file<U>(
    uploader: &U,
    name: &str,
    path: &Path,
    resolve_public_url: bool,
) -> UploadOutcome
where
    U: Uploader + ?Sized,
{
    match std::fs::read(path) {
        Ok(content) => upload_object(uploader, name, content, resolve_public_url).await,
        Err(e) => {
            error!(object = %name, path = %path.display(), error = %e, "Could not read file for upload");
            UploadOutcome::failed(name, format!("could not read {}: {}", path.display(), e))
        }
    }
}
