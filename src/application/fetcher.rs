use crate::domain::job::Job;
use crate::error::FetchError;
use crate::ports::storage::ObjectStore;
use std::path::Path;
use tracing::{error, info};

/// Pulls the source object into the job's scratch input path.
pub struct SourceFetcher<'a, S: ?Sized> {
    storage: &'a S,
}

impl<'a, S> SourceFetcher<'a, S>
where
    S: ObjectStore + ?Sized,
{
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub async fn fetch(&self, job: &Job) -> Result<u64, FetchError> {
        info!(
            bucket = %job.source.bucket,
            key = %job.source.key,
            "downloading source"
        );

        if let Some(parent) = job.input_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let written = self.storage.get(&job.source, &job.input_path).await?;
        info!(path = ?job.input_path, bytes = written, "downloaded source");

        check_file(&job.input_path).await;
        Ok(written)
    }
}

/// Log what actually landed on disk. A bad file is left for the transcoder to reject.
async fn check_file(path: &Path) {
    match tokio::fs::metadata(path).await {
        Ok(meta) => info!(path = ?path, size = meta.len(), "scratch input ready"),
        Err(e) => error!(path = ?path, error = %e, "cannot access scratch input"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::location::ObjectLocation;
    use crate::ports::storage::MockObjectStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fetch_writes_scratch_file() {
        let scratch = tempdir().unwrap();
        let source = ObjectLocation::new("in-bucket", "videos/abc123.mp4");
        let job = Job::new(source.clone(), "videos/abc123.mp4", scratch.path());

        let store = MemoryStore::new();
        store.insert(source, vec![7u8; 1024]);

        let written = SourceFetcher::new(&store).fetch(&job).await.unwrap();

        assert_eq!(written, 1024);
        assert_eq!(job.input_path, scratch.path().join("abc123.mp4"));
        assert_eq!(tokio::fs::metadata(&job.input_path).await.unwrap().len(), 1024);
    }

    #[tokio::test]
    async fn test_fetch_propagates_missing_object() {
        let scratch = tempdir().unwrap();
        let job = Job::new(
            ObjectLocation::new("in-bucket", "missing.mp4"),
            "missing.mp4",
            scratch.path(),
        );

        let result = SourceFetcher::new(&MemoryStore::new()).fetch(&job).await;
        assert!(matches!(result, Err(FetchError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_scratch_file_is_not_fatal() {
        let scratch = tempdir().unwrap();
        let job = Job::new(
            ObjectLocation::new("in-bucket", "abc123.mp4"),
            "abc123.mp4",
            scratch.path(),
        );

        // store reports success without writing anything
        let mut storage = MockObjectStore::new();
        storage.expect_get().times(1).returning(|_, _| Ok(0));

        let result = SourceFetcher::new(&storage).fetch(&job).await;
        assert_eq!(result.unwrap(), 0);
    }
}
