//! AWS Job Binary
//!
//! Runs one transcoding job end to end and exits: fetch the source from S3,
//! transcode it to an HLS ladder, publish under `processed/<key>/` in the
//! output bucket and point the video record at the master playlist.
//!
//! Environment Variables:
//! - INPUT_S3_URL: URL of the source object
//! - OUTPUT_BUCKET_NAME: Bucket receiving the HLS tree
//! - VIDEO_FILE_KEY: Source key; also derives the job id
//! - AWS_REGION, AWS_ACCESS_KEY, AWS_SECRET_ACCESS_KEY: Storage credentials
//! - METADATA_STORE_URL, METADATA_DATABASE: Metadata backend and table

use encore::adapters::aws::{self, dynamodb::DynamoMetadataStore, s3::S3Store};
use encore::adapters::ffmpeg::FfmpegTranscoder;
use encore::config::{JobConfig, MetadataBackend};
use encore::error::Chain;
use encore::ports::metadata::MetadataStore;
use encore::Pipeline;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn run<M: MetadataStore>(config: &JobConfig, storage: S3Store, metadata: M) -> ExitCode {
    let transcoder = FfmpegTranscoder::new(config.ffmpeg_path.clone());
    match Pipeline::from_config(config, storage, metadata, transcoder) {
        Ok(pipeline) => pipeline.run().await.exit_code(),
        Err(e) => {
            error!(error = %Chain(&e), "invalid job");
            ExitCode::FAILURE
        }
    }
}

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

    let sdk_config = aws::sdk_config(&config.aws).await;
    let storage = S3Store::new(aws::s3_client(&sdk_config, config.aws.s3_endpoint.as_deref()));

    match config.metadata.backend() {
        MetadataBackend::DynamoDb { endpoint } => {
            info!(table = %config.metadata.database, "using DynamoDB metadata store");
            let client = aws::dynamodb_client(&sdk_config, endpoint.as_deref());
            let metadata = DynamoMetadataStore::new(client, config.metadata.database.clone());
            run(&config, storage, metadata).await
        }
        #[cfg(feature = "local")]
        MetadataBackend::Redis { url } => {
            info!(namespace = %config.metadata.database, "using Redis metadata store");
            match encore::adapters::local::RedisMetadataStore::new(&url, &config.metadata.database)
            {
                Ok(metadata) => run(&config, storage, metadata).await,
                Err(e) => {
                    error!(error = %Chain(&e), "failed to set up Redis metadata store");
                    ExitCode::FAILURE
                }
            }
        }
        #[cfg(not(feature = "local"))]
        MetadataBackend::Redis { .. } => {
            error!("Redis metadata store requires the `local` feature");
            ExitCode::FAILURE
        }
    }
}
