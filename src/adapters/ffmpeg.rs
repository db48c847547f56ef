use crate::domain::plan::EncodingPlan;
use crate::error::TranscodeError;
use crate::ports::transcoder::{TranscodeReport, Transcoder};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

/// Lines of engine output kept as diagnostics.
const DIAGNOSTIC_LINES: usize = 40;

/// Runs the plan through the ffmpeg CLI as a child process.
#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Last `DIAGNOSTIC_LINES` non-empty lines of the engine's output.
fn tail(output: &[u8]) -> String {
    let text = String::from_utf8_lossy(output);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join("\n")
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, plan: &EncodingPlan) -> Result<TranscodeReport, TranscodeError> {
        let args = plan.to_args();
        debug!(program = %self.program, ?args, "launching transcoder");

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TranscodeError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        // ffmpeg logs to stderr; stdout is only used by some wrappers
        let mut diagnostics = tail(&output.stderr);
        if diagnostics.is_empty() {
            diagnostics = tail(&output.stdout);
        }

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                status: output.status,
                diagnostics,
            });
        }

        info!(renditions = plan.renditions.len(), "transcoder finished");
        Ok(TranscodeReport { diagnostics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rendition::default_ladder;
    use std::path::Path;

    fn plan() -> EncodingPlan {
        EncodingPlan::new(Path::new("in.mp4"), Path::new("out"), default_ladder())
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        let output: String = (0..100).map(|i| format!("line {}\n\n", i)).collect();
        let tail = tail(output.as_bytes());
        let lines: Vec<&str> = tail.lines().collect();
        assert_eq!(lines.len(), DIAGNOSTIC_LINES);
        assert_eq!(lines.first(), Some(&"line 60"));
        assert_eq!(lines.last(), Some(&"line 99"));
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let transcoder = FfmpegTranscoder::new("true");
        assert!(transcoder.transcode(&plan()).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let transcoder = FfmpegTranscoder::new("false");
        let result = transcoder.transcode(&plan()).await;
        match result {
            Err(TranscodeError::Failed { status, .. }) => assert!(!status.success()),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg-binary");
        let result = transcoder.transcode(&plan()).await;
        assert!(matches!(result, Err(TranscodeError::Spawn { .. })));
    }
}
