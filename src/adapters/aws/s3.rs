use crate::domain::location::ObjectLocation;
use crate::error::{BoxError, FetchError};
use crate::ports::storage::ObjectStore;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

/// S3Store implements ObjectStore for AWS S3 and S3-compatible services.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, location: &ObjectLocation, local_path: &Path) -> Result<u64, FetchError> {
        let remote = |source: BoxError| FetchError::Remote {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            source,
        };

        let resp = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|err| {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    FetchError::NotFound {
                        bucket: location.bucket.clone(),
                        key: location.key.clone(),
                    }
                } else {
                    remote(err.into())
                }
            })?;

        let io_err = |source: std::io::Error| FetchError::Io {
            path: local_path.to_path_buf(),
            source,
        };

        let mut body = resp.body.into_async_read();
        let mut file = BufWriter::new(File::create(local_path).await.map_err(io_err)?);
        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(|e| remote(e.into()))?;
        file.flush().await.map_err(io_err)?;

        debug!(%location, bytes = written, "object streamed to disk");
        Ok(written)
    }

    async fn put(
        &self,
        location: &ObjectLocation,
        local_path: &Path,
        content_type: &str,
    ) -> Result<(), BoxError> {
        let body = ByteStream::from_path(local_path).await?;

        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_type(content_type)
            .body(body)
            .send()
            .await?;
        Ok(())
    }
}
