use crate::domain::record::VideoRecord;
use crate::error::MetadataError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Establish (or verify) the connection. Called once before any lookup.
    async fn connect(&self) -> Result<(), MetadataError>;

    /// Look up a record by job identifier. Absence is `Ok(None)`.
    async fn find(&self, id: &str) -> Result<Option<VideoRecord>, MetadataError>;

    /// Set the playable URL on an existing record and return it.
    async fn update_url(&self, id: &str, url: &str) -> Result<VideoRecord, MetadataError>;

    /// Release the connection. Called once at teardown.
    async fn close(&self) -> Result<(), MetadataError>;
}
