use crate::domain::location::ObjectLocation;
use crate::error::{BoxError, FetchError};
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream an object to a local path without buffering it whole.
    /// Returns the number of bytes written.
    async fn get(&self, location: &ObjectLocation, local_path: &Path) -> Result<u64, FetchError>;

    /// Upload a local file under the given location.
    async fn put(
        &self,
        location: &ObjectLocation,
        local_path: &Path,
        content_type: &str,
    ) -> Result<(), BoxError>;
}
