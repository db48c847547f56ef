//! Process configuration, read once at startup.

use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_DATABASE: &str = "videos";
const DEFAULT_UPLOAD_CONCURRENCY: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Static credentials passed straight through to the storage client.
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AwsSettings {
    pub region: String,
    /// `None` falls back to the SDK's default provider chain.
    pub credentials: Option<StaticCredentials>,
    /// S3-compatible endpoint override.
    pub s3_endpoint: Option<String>,
}

/// Which metadata backend the connection string selects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataBackend {
    Redis { url: String },
    DynamoDb { endpoint: Option<String> },
}

#[derive(Clone, Debug)]
pub struct MetadataSettings {
    pub connection: Option<String>,
    /// DynamoDB table or Redis key namespace.
    pub database: String,
}

impl MetadataSettings {
    pub fn backend(&self) -> MetadataBackend {
        match self.connection.as_deref() {
            Some(url) if url.starts_with("redis://") || url.starts_with("rediss://") => {
                MetadataBackend::Redis {
                    url: url.to_string(),
                }
            }
            other => MetadataBackend::DynamoDb {
                endpoint: other.map(str::to_string),
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct JobConfig {
    /// Endpoint-style URL of the source object.
    pub source_url: String,
    pub output_bucket: String,
    /// Source key: seeds scratch names, the destination prefix and the job id.
    pub source_key: String,
    pub aws: AwsSettings,
    pub metadata: MetadataSettings,
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: String,
    pub upload_concurrency: usize,
    /// Base of the public playback URL; defaults to the regional S3 endpoint.
    pub public_base_url: Option<String>,
    /// Root directory of the filesystem object store (local deployment).
    pub local_storage_root: PathBuf,
}

impl JobConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let credentials = match (
            get("AWS_ACCESS_KEY").or_else(|| get("AWS_ACCESS_KEY_ID")),
            get("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            _ => None,
        };

        let upload_concurrency = match get("UPLOAD_CONCURRENCY") {
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "UPLOAD_CONCURRENCY",
                        value,
                    })
                }
            },
            None => DEFAULT_UPLOAD_CONCURRENCY,
        };

        Ok(Self {
            source_url: required("INPUT_S3_URL")?,
            output_bucket: required("OUTPUT_BUCKET_NAME")?,
            source_key: required("VIDEO_FILE_KEY")?,
            aws: AwsSettings {
                region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                credentials,
                s3_endpoint: get("S3_ENDPOINT_URL"),
            },
            metadata: MetadataSettings {
                connection: get("METADATA_STORE_URL"),
                database: get("METADATA_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            scratch_dir: get("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp")),
            ffmpeg_path: get("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            upload_concurrency,
            public_base_url: get("PUBLIC_BASE_URL"),
            local_storage_root: get("LOCAL_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./storage")),
        })
    }

    /// Base under which published objects are publicly reachable.
    pub fn public_base(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://s3.{}.amazonaws.com", self.aws.region),
        }
    }
}
