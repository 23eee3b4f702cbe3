//! Managed image CDN backend (Cloudflare Images).
//!
//! One upload per photo under the custom id `{batch_id}-{photo_id}`. The CDN
//! renders the thumbnail as a named variant, so `put_thumbnail` uploads nothing
//! and only returns the variant URL.

use crate::keys::PhotoKey;
use crate::traits::{PhotoStorage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

const API_BASE: &str = "https://api.cloudflare.com/client/v4";
const DELIVERY_BASE: &str = "https://imagedelivery.net";
const PUBLIC_VARIANT: &str = "public";
const THUMBNAIL_VARIANT: &str = "thumbnail";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    result: Option<UploadResult>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    id: String,
}

/// Cloudflare Images storage
#[derive(Clone)]
pub struct ImagesStorage {
    http_client: reqwest::Client,
    api_base: String,
    delivery_base: String,
    account_id: String,
    api_token: String,
    account_hash: String,
}

impl ImagesStorage {
    pub fn new(account_id: String, api_token: String, account_hash: String) -> StorageResult<Self> {
        Self::with_endpoints(
            account_id,
            api_token,
            account_hash,
            API_BASE.to_string(),
            DELIVERY_BASE.to_string(),
        )
    }

    /// Point the client at other API and delivery hosts.
    pub fn with_endpoints(
        account_id: String,
        api_token: String,
        account_hash: String,
        api_base: String,
        delivery_base: String,
    ) -> StorageResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            delivery_base: delivery_base.trim_end_matches('/').to_string(),
            account_id,
            api_token,
            account_hash,
        })
    }

    /// `https://imagedelivery.net/{hash}/{image_id}/{variant}`
    fn variant_url(&self, image_id: &str, variant: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.delivery_base, self.account_hash, image_id, variant
        )
    }

    async fn upload_image(
        &self,
        image_id: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let size = data.len();
        let start = std::time::Instant::now();

        let part = Part::bytes(data.to_vec())
            .file_name(image_id.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;
        let form = Form::new()
            .part("file", part)
            .text("id", image_id.to_string());

        let response = self
            .http_client
            .post(format!(
                "{}/accounts/{}/images/v1",
                self.api_base, self.account_id
            ))
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Image CDN request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = %status,
                image_id = %image_id,
                size_bytes = size,
                "Image CDN upload rejected"
            );
            return Err(StorageError::UploadFailed(format!(
                "Image CDN upload failed: {} - {}",
                status, error_text
            )));
        }

        let parsed: UploadResponse = response.json().await.map_err(|e| {
            StorageError::BackendError(format!("Failed to parse image CDN response: {}", e))
        })?;

        let result = match parsed.result {
            Some(result) if parsed.success => result,
            _ => {
                return Err(StorageError::UploadFailed(format!(
                    "Image CDN API error: {}",
                    serde_json::Value::Array(parsed.errors)
                )))
            }
        };

        tracing::info!(
            image_id = %result.id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image CDN upload successful"
        );

        Ok(result.id)
    }
}

#[async_trait]
impl PhotoStorage for ImagesStorage {
    async fn put_original(
        &self,
        key: &PhotoKey,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        let image_id = self
            .upload_image(&key.image_id(), content_type, data)
            .await?;
        let url = self.variant_url(&image_id, PUBLIC_VARIANT);
        Ok(StoredObject { key: image_id, url })
    }

    async fn put_thumbnail(
        &self,
        key: &PhotoKey,
        _content_type: &str,
        _data: Bytes,
    ) -> StorageResult<StoredObject> {
        let image_id = key.image_id();
        let url = self.variant_url(&image_id, THUMBNAIL_VARIANT);
        Ok(StoredObject { key: image_id, url })
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.variant_url(storage_key, PUBLIC_VARIANT)
    }

    async fn read_original(&self, storage_key: &str) -> StorageResult<Bytes> {
        let url = self.variant_url(storage_key, PUBLIC_VARIANT);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }
        if !status.is_success() {
            return Err(StorageError::DownloadFailed(format!(
                "Image CDN returned {} for {}",
                status, storage_key
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))
    }

    fn derives_thumbnails(&self) -> bool {
        true
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Images
    }
}
