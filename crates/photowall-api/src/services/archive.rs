//! Zip export of batches.
//!
//! Each batch becomes a folder named `{uploader} - {YYYY-MM-DD}` holding a
//! `metadata.json` and the original files of its visible photos.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};
use photowall_core::models::{validate_identifier, Batch, Photo};
use photowall_core::AppError;
use photowall_db::PhotoCatalog;
use photowall_storage::PhotoStorage;
use serde::Serialize;

const METADATA_FILE: &str = "metadata.json";

/// A finished archive ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct Archive {
    /// Suggested download name
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchMetadata {
    uploader: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch_comment: Option<String>,
    upload_date: String,
    photo_count: usize,
    photos: Vec<PhotoMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhotoMetadata {
    filename: String,
    uploaded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

struct ArchiveEntry {
    path: String,
    data: Bytes,
    modified_at: i64,
}

pub struct ArchiveService {
    catalog: Arc<dyn PhotoCatalog>,
    storage: Arc<dyn PhotoStorage>,
}

impl ArchiveService {
    pub fn new(catalog: Arc<dyn PhotoCatalog>, storage: Arc<dyn PhotoStorage>) -> Self {
        Self { catalog, storage }
    }

    /// Build an archive of one batch, or of every batch with visible photos.
    #[tracing::instrument(skip(self))]
    pub async fn build(&self, batch_id: Option<&str>) -> Result<Archive, AppError> {
        let (batches, filename) = match batch_id {
            Some(id) => {
                validate_identifier("batchId", id)?;
                let batch = self
                    .catalog
                    .get_batch(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Batch {} not found", id)))?;
                let filename = format!(
                    "{}-{}.zip",
                    download_safe(&batch.uploader_name),
                    format_day(batch.timestamp)
                );
                (vec![batch], filename)
            }
            None => (
                self.catalog.get_all_batches().await?,
                format!("all-photos-{}.zip", Utc::now().format("%Y-%m-%d")),
            ),
        };
        let single = batch_id.is_some();

        let mut entries = Vec::new();
        let mut folders = HashSet::new();
        let mut photo_total = 0usize;

        for batch in batches {
            let photos = self.catalog.get_batch_photos(&batch.id, false).await?;
            if photos.is_empty() && !single {
                continue;
            }

            let folder = unique_folder_name(&mut folders, &folder_name(&batch));
            photo_total += self
                .collect_batch(&batch, &folder, photos, &mut entries)
                .await?;
        }

        let data = tokio::task::spawn_blocking(move || write_zip(entries))
            .await
            .context("Archive task failed")??;

        tracing::info!(
            photos = photo_total,
            size_bytes = data.len(),
            "Archive built"
        );

        Ok(Archive { filename, data })
    }

    async fn collect_batch(
        &self,
        batch: &Batch,
        folder: &str,
        photos: Vec<Photo>,
        entries: &mut Vec<ArchiveEntry>,
    ) -> Result<usize, AppError> {
        let mut names = HashSet::new();
        names.insert(METADATA_FILE.to_string());

        let mut metadata = BatchMetadata {
            uploader: batch.uploader_name.clone(),
            batch_comment: batch.comment.clone(),
            upload_date: format_instant(batch.timestamp),
            photo_count: 0,
            photos: Vec::with_capacity(photos.len()),
        };

        for photo in &photos {
            let Some(key) = photo.storage_key.as_deref() else {
                tracing::warn!(photo_id = %photo.id, "Photo has no storage key, skipping file");
                continue;
            };
            let data = match self.storage.read_original(key).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, error = %e, "Failed to read original, skipping file");
                    continue;
                }
            };

            let fallback = format!("photo-{}.jpg", photo.id);
            let filename = unique_file_name(
                &mut names,
                &sanitize_archive_filename(&photo.export_filename(), &fallback),
            );
            entries.push(ArchiveEntry {
                path: format!("{}/{}", folder, filename),
                data,
                modified_at: photo.uploaded_at,
            });
            metadata.photos.push(PhotoMetadata {
                filename,
                uploaded_at: format_instant(photo.uploaded_at),
                comment: photo.effective_comment().map(String::from),
            });
        }
        metadata.photo_count = metadata.photos.len();

        let json = serde_json::to_vec_pretty(&metadata)?;
        entries.push(ArchiveEntry {
            path: format!("{}/{}", folder, METADATA_FILE),
            data: Bytes::from(json),
            modified_at: batch.timestamp,
        });
        Ok(metadata.photo_count)
    }
}

fn write_zip(entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, AppError> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let base = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for entry in entries {
            let options = match zip_timestamp(entry.modified_at) {
                Some(ts) => base.last_modified_time(ts),
                None => base,
            };
            zip.start_file(entry.path.as_str(), options)
                .with_context(|| format!("Failed to add file to ZIP: {}", entry.path))?;
            zip.write_all(&entry.data)
                .with_context(|| format!("Failed to write file data to ZIP: {}", entry.path))?;
        }

        zip.finish().context("Failed to finalize ZIP archive")?;
    }

    Ok(buffer)
}

fn zip_timestamp(millis: i64) -> Option<zip::DateTime> {
    let dt = DateTime::<Utc>::from_timestamp_millis(millis)?;
    let year = u16::try_from(dt.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )
    .ok()
}

/// ISO-8601 instant with millisecond precision, e.g. `2025-06-01T18:30:00.000Z`.
fn format_instant(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_day(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string()
}

fn folder_name(batch: &Batch) -> String {
    let uploader: String = batch
        .uploader_name
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let uploader = uploader.trim().trim_matches('.');
    let uploader = if uploader.is_empty() {
        batch.id.as_str()
    } else {
        uploader
    };
    format!("{} - {}", uploader, format_day(batch.timestamp))
}

/// ASCII-only variant of a name for the Content-Disposition header.
fn download_safe(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if safe.is_empty() {
        "photos".to_string()
    } else {
        safe
    }
}

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// First candidate, for n = 2, 3, ..., that is not yet in `taken`.
fn first_free(
    taken: &mut HashSet<String>,
    name: &str,
    numbered: impl Fn(u32) -> String,
) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = numbered(n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// `cake.jpg`, then `cake (2).jpg`, `cake (3).jpg`...
fn unique_file_name(taken: &mut HashSet<String>, name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            first_free(taken, name, |n| format!("{} ({}).{}", stem, n, ext))
        }
        _ => first_free(taken, name, |n| format!("{} ({})", name, n)),
    }
}

/// Folder names are numbered at the end; dots in uploader names are not extensions.
fn unique_folder_name(taken: &mut HashSet<String>, name: &str) -> String {
    first_free(taken, name, |n| format!("{} ({})", name, n))
}
