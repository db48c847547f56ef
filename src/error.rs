//! Error kinds raised by the pipeline stages.
//!
//! Every stage either succeeds or returns exactly one of these. None of them
//! are retried; the orchestrator converts them into a failed job outcome.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Boxed error used by adapters to carry SDK-specific failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The source object could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid source reference {url:?}: {reason}")]
    InvalidSource { url: String, reason: String },

    #[error("source object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("failed to retrieve {bucket}/{key}")]
    Remote {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write scratch file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The transcoding engine failed or produced an incomplete tree.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("failed to launch transcoder {program:?}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transcoder exited with {status}: {diagnostics}")]
    Failed {
        status: ExitStatus,
        diagnostics: String,
    },

    #[error("failed to prepare output directory {path:?}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcoder output incomplete: {0}")]
    IncompleteOutput(String),
}

/// A destination write failed.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to walk output tree {path:?}")]
    Walk {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to upload {local:?} to {bucket}/{key}")]
    Upload {
        local: PathBuf,
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },
}

/// Communication with the metadata store failed. A missing record is not an error.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to connect to metadata store")]
    Connect(#[source] BoxError),

    #[error("metadata query for {id:?} failed")]
    Query {
        id: String,
        #[source]
        source: BoxError,
    },

    #[error("metadata update for {id:?} failed")]
    Update {
        id: String,
        #[source]
        source: BoxError,
    },
}

/// A fatal job failure, tagged with the stage that raised it.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("fetch failed")]
    Fetch(#[from] FetchError),

    #[error("transcode failed")]
    Transcode(#[from] TranscodeError),

    #[error("publish failed")]
    Publish(#[from] PublishError),

    #[error("metadata update failed")]
    Metadata(#[from] MetadataError),
}

/// Renders an error followed by its `source()` chain on one line.
pub struct Chain<'a>(pub &'a (dyn std::error::Error + 'static));

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_includes_sources() {
        let err = PipelineError::from(FetchError::NotFound {
            bucket: "in-bucket".to_string(),
            key: "videos/abc123.mp4".to_string(),
        });

        assert_eq!(
            Chain(&err).to_string(),
            "fetch failed: source object in-bucket/videos/abc123.mp4 not found"
        );
    }

    #[test]
    fn test_chain_without_source() {
        let err = TranscodeError::IncompleteOutput("master.m3u8 missing".to_string());
        assert_eq!(
            Chain(&err).to_string(),
            "transcoder output incomplete: master.m3u8 missing"
        );
    }
}
