//! In-memory adapters for tests and dry runs.

use crate::domain::location::ObjectLocation;
use crate::domain::record::VideoRecord;
use crate::error::{BoxError, FetchError, MetadataError};
use crate::ports::metadata::MetadataStore;
use crate::ports::storage::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<ObjectLocation, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: ObjectLocation, body: impl Into<Bytes>) {
        self.lock().insert(
            location,
            StoredObject {
                body: body.into(),
                content_type: None,
            },
        );
    }

    pub fn object(&self, location: &ObjectLocation) -> Option<StoredObject> {
        self.lock().get(location).cloned()
    }

    /// Sorted keys stored in `bucket`.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .keys()
            .filter(|location| location.bucket == bucket)
            .map(|location| location.key.clone())
            .collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ObjectLocation, StoredObject>> {
        // a panic while holding the lock leaves the map itself intact
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, location: &ObjectLocation, local_path: &Path) -> Result<u64, FetchError> {
        let object = self.object(location).ok_or_else(|| FetchError::NotFound {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        })?;
        tokio::fs::write(local_path, &object.body)
            .await
            .map_err(|e| FetchError::Io {
                path: local_path.to_path_buf(),
                source: e,
            })?;
        Ok(object.body.len() as u64)
    }

    async fn put(
        &self,
        location: &ObjectLocation,
        local_path: &Path,
        content_type: &str,
    ) -> Result<(), BoxError> {
        let body = tokio::fs::read(local_path).await?;
        self.lock().insert(
            location.clone(),
            StoredObject {
                body: Bytes::from(body),
                content_type: Some(content_type.to_string()),
            },
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: Mutex<HashMap<String, VideoRecord>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: VideoRecord) {
        self.lock().insert(record.id.clone(), record);
    }

    pub fn record(&self, id: &str) -> Option<VideoRecord> {
        self.lock().get(id).cloned()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, VideoRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn connect(&self) -> Result<(), MetadataError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<VideoRecord>, MetadataError> {
        Ok(self.record(id))
    }

    async fn update_url(&self, id: &str, url: &str) -> Result<VideoRecord, MetadataError> {
        let mut records = self.lock();
        let record = records.get_mut(id).ok_or_else(|| MetadataError::Update {
            id: id.to_string(),
            source: "record disappeared before update".into(),
        })?;
        record.url = Some(url.to_string());
        Ok(record.clone())
    }

    async fn close(&self) -> Result<(), MetadataError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
