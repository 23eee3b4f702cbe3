//! Storage double that keeps objects in memory and records every write.

use async_trait::async_trait;
use bytes::Bytes;
use photowall_storage::{
    PhotoKey, PhotoStorage, StorageBackend, StorageError, StorageResult, StoredObject,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub const PUBLIC_BASE_URL: &str = "https://cdn.test";

/// One recorded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Default)]
pub struct RecordingStorage {
    puts: Mutex<Vec<RecordedPut>>,
    objects: Mutex<HashMap<String, Bytes>>,
    fail_writes: AtomicBool,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Drop a stored object so later reads fail with `NotFound`.
    pub fn forget(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    fn write(&self, key: String, content_type: &str, data: Bytes) -> StorageResult<StoredObject> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("bucket unavailable".to_string()));
        }
        self.puts.lock().unwrap().push(RecordedPut {
            key: key.clone(),
            content_type: content_type.to_string(),
            size: data.len(),
        });
        self.objects.lock().unwrap().insert(key.clone(), data);
        Ok(StoredObject {
            url: self.public_url(&key),
            key,
        })
    }
}

#[async_trait]
impl PhotoStorage for RecordingStorage {
    async fn put_original(
        &self,
        key: &PhotoKey,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        self.write(key.original_key(), content_type, data)
    }

    async fn put_thumbnail(
        &self,
        key: &PhotoKey,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        self.write(key.thumbnail_key(), content_type, data)
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", PUBLIC_BASE_URL, storage_key)
    }

    async fn read_original(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.object(storage_key)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
