//! Job orchestrator: runs the stages in order and always cleans up.
//!
//! ```text
//! Init -> Connected -> Fetched -> Transcoded -> Published -> MetadataUpdated -> Done
//!   \__________\___________\__________\____________\_______________\-> Failed
//! ```

use super::executor::TranscodeExecutor;
use super::fetcher::SourceFetcher;
use super::metadata::MetadataUpdater;
use super::publisher::AssetPublisher;
use crate::config::JobConfig;
use crate::domain::job::Job;
use crate::domain::location::ObjectLocation;
use crate::domain::record::VideoRecord;
use crate::domain::rendition::{default_ladder, Rendition};
use crate::error::{Chain, FetchError, PipelineError};
use crate::ports::metadata::MetadataStore;
use crate::ports::storage::ObjectStore;
use crate::ports::transcoder::Transcoder;
use std::fmt;
use std::io::ErrorKind;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Init,
    Connected,
    Fetched,
    Transcoded,
    Published,
    MetadataUpdated,
    Done,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Init => "init",
            JobState::Connected => "connected",
            JobState::Fetched => "fetched",
            JobState::Transcoded => "transcoded",
            JobState::Published => "published",
            JobState::MetadataUpdated => "metadata_updated",
            JobState::Done => "done",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a successful job produced.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub job_id: String,
    pub source_bytes: u64,
    pub published_keys: Vec<String>,
    pub playback_url: String,
    /// `None` when no metadata record existed for the job.
    pub record: Option<VideoRecord>,
}

#[derive(Debug)]
pub struct JobOutcome {
    /// `Done` or `Failed`.
    pub state: JobState,
    /// Last state reached before the outcome was decided.
    pub last_stage: JobState,
    pub result: Result<JobSummary, PipelineError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Per-job settings the orchestrator needs beyond the job itself.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub output_bucket: String,
    pub public_base: String,
    pub upload_concurrency: usize,
    pub renditions: Vec<Rendition>,
}

impl PipelineSettings {
    pub fn from_config(config: &JobConfig) -> Self {
        Self {
            output_bucket: config.output_bucket.clone(),
            public_base: config.public_base(),
            upload_concurrency: config.upload_concurrency,
            renditions: default_ladder(),
        }
    }
}

pub struct Pipeline<S, M, T> {
    job: Job,
    settings: PipelineSettings,
    storage: S,
    metadata: M,
    transcoder: T,
}

impl<S, M, T> Pipeline<S, M, T>
where
    S: ObjectStore,
    M: MetadataStore,
    T: Transcoder,
{
    pub fn new(job: Job, settings: PipelineSettings, storage: S, metadata: M, transcoder: T) -> Self {
        Self {
            job,
            settings,
            storage,
            metadata,
            transcoder,
        }
    }

    /// Build the job from configuration. Fails only if the source URL is malformed.
    pub fn from_config(
        config: &JobConfig,
        storage: S,
        metadata: M,
        transcoder: T,
    ) -> Result<Self, FetchError> {
        let source = ObjectLocation::from_url(&config.source_url)?;
        let job = Job::new(source, config.source_key.clone(), &config.scratch_dir);
        Ok(Self::new(
            job,
            PipelineSettings::from_config(config),
            storage,
            metadata,
            transcoder,
        ))
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Run every stage, then clean up regardless of the result.
    pub async fn run(&self) -> JobOutcome {
        info!(id = %self.job.id, key = %self.job.key, source = %self.job.source, "starting job");

        let mut stage = JobState::Init;
        let result = self.execute(&mut stage).await;

        let state = match &result {
            Ok(summary) => {
                info!(
                    id = %summary.job_id,
                    files = summary.published_keys.len(),
                    url = %summary.playback_url,
                    "video processing completed successfully"
                );
                JobState::Done
            }
            Err(err) => {
                error!(failed_at = %stage, error = %Chain(err), "video processing failed");
                JobState::Failed
            }
        };

        self.cleanup().await;

        JobOutcome {
            state,
            last_stage: stage,
            result,
        }
    }

    fn advance(&self, stage: &mut JobState, next: JobState) {
        debug!(from = %stage, to = %next, "job state");
        *stage = next;
    }

    async fn execute(&self, stage: &mut JobState) -> Result<JobSummary, PipelineError> {
        self.metadata.connect().await?;
        self.advance(stage, JobState::Connected);

        let source_bytes = SourceFetcher::new(&self.storage).fetch(&self.job).await?;
        self.advance(stage, JobState::Fetched);

        TranscodeExecutor::new(&self.transcoder, self.settings.renditions.clone())
            .run(&self.job)
            .await?;
        self.advance(stage, JobState::Transcoded);

        let published_keys = AssetPublisher::new(
            &self.storage,
            &self.settings.output_bucket,
            self.settings.upload_concurrency,
        )
        .publish(&self.job)
        .await?;
        self.advance(stage, JobState::Published);

        let updater = MetadataUpdater::new(
            &self.metadata,
            &self.settings.public_base,
            &self.settings.output_bucket,
        );
        let record = updater.update(&self.job).await?;
        self.advance(stage, JobState::MetadataUpdated);

        Ok(JobSummary {
            job_id: self.job.id.clone(),
            source_bytes,
            published_keys,
            playback_url: updater.playback_url(&self.job),
            record,
        })
    }

    /// Remove scratch state and close the metadata connection. Never fails:
    /// problems are logged and the job's outcome stands.
    pub async fn cleanup(&self) {
        match tokio::fs::remove_file(&self.job.input_path).await {
            Ok(()) => debug!(path = ?self.job.input_path, "removed scratch input"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.job.input_path, "scratch input already absent")
            }
            Err(e) => warn!(path = ?self.job.input_path, error = %e, "error during cleanup"),
        }

        match tokio::fs::remove_dir_all(&self.job.output_dir).await {
            Ok(()) => debug!(path = ?self.job.output_dir, "removed scratch output"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.job.output_dir, "scratch output already absent")
            }
            Err(e) => warn!(path = ?self.job.output_dir, error = %e, "error during cleanup"),
        }

        if let Err(e) = self.metadata.close().await {
            warn!(error = %Chain(&e), "error closing metadata store");
        }
    }
}
