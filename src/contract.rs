#![allow(unused)]

//! # contract: storage backend interface and upload outcome types
//!
//! This module defines the [`Uploader`] trait that every storage backend
//! implements, plus the plain data types passed across it.
//!
//! ## Interface
//! - [`Uploader::list_objects`] lists bucket objects whose name matches a search string.
//! - [`Uploader::upload_object`] writes one object; it must not overwrite an existing one.
//! - [`Uploader::public_url`] resolves a public URL when the backend supports it.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can generate deterministic mocks.
//!   The mock is exported with the `test-export-mocks` feature (on by default).
//!
//! ## Outcomes
//! - Callers never see backend errors directly: [`crate::publish`] turns them
//!   into an [`UploadOutcome`] with [`UploadStatus::Failed`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use mockall::{automock, predicate::*};

/// One object as reported by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredObject {
    pub name: String,
    /// Folder placeholders in a listing come back without an id.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("request to storage backend failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid storage URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    AlreadyExists,
    Failed,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Uploaded => f.write_str("uploaded"),
            UploadStatus::AlreadyExists => f.write_str("already exists"),
            UploadStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Result of publishing a single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub object_name: String,
    pub status: UploadStatus,
    pub error_detail: Option<String>,
    pub public_url: Option<String>,
}

impl UploadOutcome {
    pub fn uploaded(object_name: impl Into<String>, public_url: Option<String>) -> Self {
        UploadOutcome {
            object_name: object_name.into(),
            status: UploadStatus::Uploaded,
            error_detail: None,
            public_url,
        }
    }

    pub fn already_exists(object_name: impl Into<String>) -> Self {
        UploadOutcome {
            object_name: object_name.into(),
            status: UploadStatus::AlreadyExists,
            error_detail: None,
            public_url: None,
        }
    }

    pub fn failed(object_name: impl Into<String>, detail: impl Into<String>) -> Self {
        UploadOutcome {
            object_name: object_name.into(),
            status: UploadStatus::Failed,
            error_detail: Some(detail.into()),
            public_url: None,
        }
    }
}

/// Trait for a bucket the scenario files are published to.
/// The implementor is responsible for connecting to the backing storage API.
///
/// Authentication and bucket identity are fixed when the implementor is
/// constructed; no method takes credentials.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    /// List objects at the bucket root whose name contains `search` (empty lists everything).
    async fn list_objects(&self, search: &str) -> Result<Vec<StoredObject>, StorageError>;

    /// Create a new object named `name` holding `content`.
    async fn upload_object(&self, name: &str, content: Vec<u8>) -> Result<(), StorageError>;

    /// Public URL of an object, if the backend exposes one.
    fn public_url(&self, name: &str) -> Option<String>;
}
