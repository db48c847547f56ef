//! Local Job Binary
//!
//! Same job as `aws_job`, wired to a directory tree standing in for buckets
//! (`LOCAL_STORAGE_ROOT/<bucket>/<key>`) and Redis for video records.
//!
//! Environment Variables:
//! - INPUT_S3_URL, OUTPUT_BUCKET_NAME, VIDEO_FILE_KEY: As for `aws_job`
//! - LOCAL_STORAGE_ROOT: Root of the bucket directories
//! - METADATA_STORE_URL: redis:// URL
//! - METADATA_DATABASE: Redis key namespace

use encore::adapters::ffmpeg::FfmpegTranscoder;
use encore::adapters::local::{FsStore, RedisMetadataStore};
use encore::config::{JobConfig, MetadataBackend};
use encore::error::Chain;
use encore::Pipeline;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match JobConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let url = match config.metadata.backend() {
        MetadataBackend::Redis { url } => url,
        MetadataBackend::DynamoDb { .. } => {
            error!("METADATA_STORE_URL must be a redis:// URL for local jobs");
            return ExitCode::FAILURE;
        }
    };

    let metadata = match RedisMetadataStore::new(&url, &config.metadata.database) {
        Ok(metadata) => metadata,
        Err(e) => {
            error!(error = %Chain(&e), "failed to set up Redis metadata store");
            return ExitCode::FAILURE;
        }
    };

    info!(root = ?config.local_storage_root, "using filesystem object store");
    let storage = FsStore::new(config.local_storage_root.clone());
    let transcoder = FfmpegTranscoder::new(config.ffmpeg_path.clone());

    match Pipeline::from_config(&config, storage, metadata, transcoder) {
        Ok(pipeline) => pipeline.run().await.exit_code(),
        Err(e) => {
            error!(error = %Chain(&e), "invalid job");
            ExitCode::FAILURE
        }
    }
}
