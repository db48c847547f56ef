use crate::domain::plan::EncodingPlan;
use crate::error::TranscodeError;
use async_trait::async_trait;

/// What the engine reported on a successful run.
#[derive(Debug, Clone, Default)]
pub struct TranscodeReport {
    pub diagnostics: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run the whole plan in one invocation, resolving once the engine exits.
    async fn transcode(&self, plan: &EncodingPlan) -> Result<TranscodeReport, TranscodeError>;
}
