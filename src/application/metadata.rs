use crate::domain::job::Job;
use crate::domain::plan::MASTER_PLAYLIST;
use crate::domain::record::VideoRecord;
use crate::error::MetadataError;
use crate::ports::metadata::MetadataStore;
use tracing::{info, warn};

/// Points the job's metadata record at the published master playlist.
pub struct MetadataUpdater<'a, M: ?Sized> {
    store: &'a M,
    public_base: &'a str,
    bucket: &'a str,
}

impl<'a, M> MetadataUpdater<'a, M>
where
    M: MetadataStore + ?Sized,
{
    pub fn new(store: &'a M, public_base: &'a str, bucket: &'a str) -> Self {
        Self {
            store,
            public_base,
            bucket,
        }
    }

    pub fn playback_url(&self, job: &Job) -> String {
        format!(
            "{}/{}/{}/{}",
            self.public_base.trim_end_matches('/'),
            self.bucket,
            job.destination_prefix(),
            MASTER_PLAYLIST
        )
    }

    /// Returns `None` when no record exists for the job; the record is never created here.
    pub async fn update(&self, job: &Job) -> Result<Option<VideoRecord>, MetadataError> {
        let url = self.playback_url(job);
        info!(id = %job.id, %url, "updating video record");

        if self.store.find(&job.id).await?.is_none() {
            warn!(
                id = %job.id,
                key = %job.key,
                "no video record found for job id; playback URL was not recorded"
            );
            return Ok(None);
        }

        let updated = self.store.update_url(&job.id, &url).await?;
        info!(
            record = %serde_json::to_string(&updated).unwrap_or_default(),
            "video record updated"
        );
        Ok(Some(updated))
    }
}
