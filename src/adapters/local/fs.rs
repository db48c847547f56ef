use crate::domain::location::ObjectLocation;
use crate::error::{BoxError, FetchError};
use crate::ports::storage::ObjectStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem-backed ObjectStore: each bucket is a directory under `root`,
/// each key a relative path inside it.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, location: &ObjectLocation) -> PathBuf {
        self.root.join(&location.bucket).join(&location.key)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, location: &ObjectLocation, local_path: &Path) -> Result<u64, FetchError> {
        let source = self.path_of(location);
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        // tokio::fs::copy streams in chunks
        tokio::fs::copy(&source, local_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FetchError::NotFound {
                    bucket: location.bucket.clone(),
                    key: location.key.clone(),
                },
                _ => FetchError::Remote {
                    bucket: location.bucket.clone(),
                    key: location.key.clone(),
                    source: Box::new(e),
                },
            })
    }

    async fn put(
        &self,
        location: &ObjectLocation,
        local_path: &Path,
        content_type: &str,
    ) -> Result<(), BoxError> {
        let destination = self.path_of(location);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &destination).await?;
        debug!(path = ?destination, content_type, "stored object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_then_get() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let store = FsStore::new(root.path());

        let local = scratch.path().join("segment0.ts");
        tokio::fs::write(&local, b"segment bytes").await.unwrap();

        let location = ObjectLocation::new("out-bucket", "processed/a.mp4/0/segment0.ts");
        store.put(&location, &local, "video/MP2T").await.unwrap();
        assert!(root
            .path()
            .join("out-bucket/processed/a.mp4/0/segment0.ts")
            .exists());

        let fetched = scratch.path().join("nested/copy.ts");
        let written = store.get(&location, &fetched).await.unwrap();
        assert_eq!(written, 13);
        assert_eq!(tokio::fs::read(&fetched).await.unwrap(), b"segment bytes");
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let store = FsStore::new(root.path());

        let result = store
            .get(
                &ObjectLocation::new("in-bucket", "missing.mp4"),
                &scratch.path().join("missing.mp4"),
            )
            .await;
        assert!(matches!(result, Err(FetchError::NotFound { .. })));
    }
}
