use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::StorageConfig;
use crate::contract::{StorageError, StoredObject, Uploader};

/// Page size for bucket listings.
const LIST_PAGE_SIZE: usize = 1000;

/// Supabase Storage REST client bound to a single bucket.
///
/// The service key is sent both as bearer token and as `apikey` header.
pub struct SupabaseUploader {
    client: Client,
    base_url: Url,
    bucket: String,
    service_key: String,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    search: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl SupabaseUploader {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::with_client(config, Client::new())
    }

    /// Same as [`SupabaseUploader::new`] but over a caller-built HTTP client.
    pub fn with_client(config: &StorageConfig, client: Client) -> Result<Self, StorageError> {
        let base_url = Url::parse(config.url.trim())
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {e}", config.url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(config.url.clone()));
        }
        Ok(SupabaseUploader {
            client,
            base_url,
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
        })
    }

    /// `{base}/storage/v1/object/{route...}/{bucket}/{object name segments}`
    fn endpoint(&self, route: &[&str], object_name: Option<&str>) -> Result<Url, StorageError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["storage", "v1", "object"]);
            segments.extend(route);
            segments.push(&self.bucket);
            if let Some(name) = object_name {
                segments.extend(name.split('/'));
            }
        }
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);
        error!(status = status.as_u16(), message = %message, "Storage backend returned an error");
        Err(StorageError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Uploader for SupabaseUploader {
    async fn list_objects(&self, search: &str) -> Result<Vec<StoredObject>, StorageError> {
        let url = self.endpoint(&["list"], None)?;
        let mut objects = Vec::new();
        let mut offset = 0;

        loop {
            let body = ListRequest {
                prefix: "",
                search,
                limit: LIST_PAGE_SIZE,
                offset,
                sort_by: SortBy {
                    column: "name",
                    order: "asc",
                },
            };
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(&self.service_key)
                .header("apikey", &self.service_key)
                .json(&body)
                .send()
                .await?;
            let page: Vec<StoredObject> = Self::check(response).await?.json().await?;
            let count = page.len();
            objects.extend(page);
            debug!(bucket = %self.bucket, offset, count, "Listed bucket page");

            if count < LIST_PAGE_SIZE {
                break;
            }
            offset += count;
        }

        Ok(objects)
    }

    async fn upload_object(&self, name: &str, content: Vec<u8>) -> Result<(), StorageError> {
        let url = self.endpoint(&[], Some(name))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header("x-upsert", "false")
            .body(content)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn public_url(&self, name: &str) -> Option<String> {
        self.endpoint(&["public"], Some(name))
            .ok()
            .map(|url| url.to_string())
    }
}
