use crate::domain::content_type::content_type_for;
use crate::domain::job::Job;
use crate::domain::location::ObjectLocation;
use crate::error::PublishError;
use crate::ports::storage::ObjectStore;
use futures::{StreamExt, TryStreamExt};
use std::path::PathBuf;
use tracing::{debug, info};
use walkdir::WalkDir;

/// One file of the transcoded tree and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub local_path: PathBuf,
    pub relative_path: PathBuf,
    pub key: String,
    pub content_type: &'static str,
}

/// Every regular file under the job's output directory, ordered by relative path.
pub async fn collect_assets(job: &Job) -> Result<Vec<Asset>, PublishError> {
    let root = job.output_dir.clone();
    let walk_root = root.clone();

    let files = tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&walk_root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    })
    .await
    .map_err(|e| PublishError::Walk {
        path: root.clone(),
        source: e.into(),
    })?
    .map_err(|e| PublishError::Walk {
        path: root.clone(),
        source: e.into(),
    })?;

    Ok(files
        .into_iter()
        .filter_map(|local_path| {
            let relative_path = local_path.strip_prefix(&root).ok()?.to_path_buf();
            Some(Asset {
                key: job.destination_key(&relative_path),
                content_type: content_type_for(&local_path),
                relative_path,
                local_path,
            })
        })
        .collect())
}

/// Uploads the transcoded tree to the destination bucket.
pub struct AssetPublisher<'a, S: ?Sized> {
    storage: &'a S,
    bucket: &'a str,
    concurrency: usize,
}

impl<'a, S> AssetPublisher<'a, S>
where
    S: ObjectStore + ?Sized,
{
    pub fn new(storage: &'a S, bucket: &'a str, concurrency: usize) -> Self {
        Self {
            storage,
            bucket,
            concurrency: concurrency.max(1),
        }
    }

    async fn upload(&self, asset: Asset) -> Result<String, PublishError> {
        let location = ObjectLocation::new(self.bucket, asset.key);
        debug!(file = ?asset.local_path, %location, content_type = asset.content_type, "uploading");

        self.storage
            .put(&location, &asset.local_path, asset.content_type)
            .await
            .map_err(|source| PublishError::Upload {
                local: asset.local_path.clone(),
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                source,
            })?;
        Ok(location.key)
    }

    /// Upload every asset, at most `concurrency` at a time. The first failure
    /// aborts the remaining uploads. Returns the destination keys, sorted.
    pub async fn publish(&self, job: &Job) -> Result<Vec<String>, PublishError> {
        let assets = collect_assets(job).await?;
        info!(
            files = assets.len(),
            bucket = %self.bucket,
            prefix = %job.destination_prefix(),
            "publishing"
        );

        let mut keys: Vec<String> = futures::stream::iter(assets)
            .map(|asset| self.upload(asset))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;
        keys.sort();

        info!(
            files = keys.len(),
            "uploaded processed video files to {}/{}/",
            self.bucket,
            job.destination_prefix()
        );
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::application::fixtures::write_engine_output;
    use crate::domain::content_type::{MANIFEST_CONTENT_TYPE, SEGMENT_CONTENT_TYPE};
    use crate::domain::plan::EncodingPlan;
    use crate::domain::rendition::default_ladder;
    use crate::ports::storage::MockObjectStore;
    use std::path::Path;
    use tempfile::tempdir;

    fn job_with_output(scratch: &Path) -> Job {
        let job = Job::new(
            ObjectLocation::new("in-bucket", "videos/abc123.mp4"),
            "videos/abc123.mp4",
            scratch,
        );
        write_engine_output(&EncodingPlan::new(
            &job.input_path,
            &job.output_dir,
            default_ladder(),
        ));
        job
    }

    #[tokio::test]
    async fn test_collect_assets_maps_every_file() {
        let scratch = tempdir().unwrap();
        let job = job_with_output(scratch.path());

        let assets = collect_assets(&job).await.unwrap();

        // 4 variants x (playlist + 2 segments) + master
        assert_eq!(assets.len(), 13);
        let master = assets
            .iter()
            .find(|a| a.relative_path == Path::new("master.m3u8"))
            .unwrap();
        assert_eq!(master.key, "processed/videos/abc123.mp4/master.m3u8");
        assert_eq!(master.content_type, MANIFEST_CONTENT_TYPE);

        let segment = assets
            .iter()
            .find(|a| a.relative_path == Path::new("2/segment1.ts"))
            .unwrap();
        assert_eq!(segment.key, "processed/videos/abc123.mp4/2/segment1.ts");
        assert_eq!(segment.content_type, SEGMENT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_publish_uploads_tree() {
        let scratch = tempdir().unwrap();
        let job = job_with_output(scratch.path());
        let store = MemoryStore::new();

        let keys = AssetPublisher::new(&store, "out-bucket", 4)
            .publish(&job)
            .await
            .unwrap();

        assert_eq!(keys, store.keys("out-bucket"));
        for idx in 0..4 {
            let key = format!("processed/videos/abc123.mp4/{}/playlist.m3u8", idx);
            let object = store.object(&ObjectLocation::new("out-bucket", key)).unwrap();
            assert_eq!(object.content_type.as_deref(), Some(MANIFEST_CONTENT_TYPE));
        }
        let segment = store
            .object(&ObjectLocation::new(
                "out-bucket",
                "processed/videos/abc123.mp4/0/segment0.ts",
            ))
            .unwrap();
        assert_eq!(segment.body.as_ref(), b"360p #0");
        assert_eq!(segment.content_type.as_deref(), Some(SEGMENT_CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_republish_yields_same_keys() {
        let scratch = tempdir().unwrap();
        let job = job_with_output(scratch.path());
        let store = MemoryStore::new();
        let publisher = AssetPublisher::new(&store, "out-bucket", 2);

        let first = publisher.publish(&job).await.unwrap();
        let second = publisher.publish(&job).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.keys("out-bucket").len(), first.len());
    }

    #[tokio::test]
    async fn test_single_failed_upload_aborts_publish() {
        let scratch = tempdir().unwrap();
        let job = job_with_output(scratch.path());

        let mut storage = MockObjectStore::new();
        storage.expect_put().returning(|location, _, _| {
            if location.key.ends_with("1/segment0.ts") {
                Err("access denied".into())
            } else {
                Ok(())
            }
        });

        let err = AssetPublisher::new(&storage, "out-bucket", 1)
            .publish(&job)
            .await
            .unwrap_err();

        match err {
            PublishError::Upload { key, .. } => {
                assert_eq!(key, "processed/videos/abc123.mp4/1/segment0.ts")
            }
            other => panic!("expected upload error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_output_dir_is_walk_error() {
        let scratch = tempdir().unwrap();
        let job = Job::new(
            ObjectLocation::new("in-bucket", "abc123.mp4"),
            "abc123.mp4",
            scratch.path(),
        );

        let result = collect_assets(&job).await;
        assert!(matches!(result, Err(PublishError::Walk { .. })));
    }

    #[tokio::test]
    async fn test_relative_paths_are_sorted() {
        let scratch = tempdir().unwrap();
        let job = job_with_output(scratch.path());

        let assets = collect_assets(&job).await.unwrap();
        let paths: Vec<&Path> = assets.iter().map(|a| a.relative_path.as_path()).collect();
        assert_eq!(paths.first(), Some(&Path::new("0/playlist.m3u8")));
        assert_eq!(paths.last(), Some(&Path::new("master.m3u8")));
    }
}
