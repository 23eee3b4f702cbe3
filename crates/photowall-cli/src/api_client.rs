//! Minimal HTTP client for the Photowall API.

use anyhow::{Context, Result};
use bytes::Bytes;
use photowall_core::models::{ExportResponse, ListPhotosResponse};
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A downloaded zip archive.
#[derive(Debug, Clone)]
pub struct ArchiveDownload {
    /// Name suggested by the server's Content-Disposition header
    pub filename: Option<String>,
    pub data: Bytes,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: PHOTOWALL_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("PHOTOWALL_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.send(path, query)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    /// `GET /photos`
    pub async fn list_photos(
        &self,
        limit: Option<i64>,
        include_deleted: bool,
    ) -> Result<ListPhotosResponse> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if include_deleted {
            query.push(("includeDeleted", "true".to_string()));
        }
        self.get("/photos", &query).await
    }

    /// `GET /photos/export`
    pub async fn export_metadata(&self, batch_id: Option<&str>) -> Result<ExportResponse> {
        let query: Vec<(&str, String)> = batch_id
            .map(|id| vec![("batchId", id.to_string())])
            .unwrap_or_default();
        self.get("/photos/export", &query).await
    }

    /// `GET /photos/export/archive`
    pub async fn download_archive(&self, batch_id: Option<&str>) -> Result<ArchiveDownload> {
        let query: Vec<(&str, String)> = batch_id
            .map(|id| vec![("batchId", id.to_string())])
            .unwrap_or_default();
        let response = self.send("/photos/export/archive", &query).await?;

        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename);
        let data = response
            .bytes()
            .await
            .context("Failed to read archive body")?;

        Ok(ArchiveDownload { filename, data })
    }
}

/// Extract `filename="..."` from a Content-Disposition value.
fn attachment_filename(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
}
