use crate::domain::hls::{MasterPlaylist, MediaPlaylist};
use crate::domain::job::Job;
use crate::domain::plan::EncodingPlan;
use crate::domain::rendition::Rendition;
use crate::error::TranscodeError;
use crate::ports::transcoder::Transcoder;
use std::path::Path;
use tracing::{debug, info};

/// Plans the rendition ladder for a job and drives the engine through it.
pub struct TranscodeExecutor<'a, T: ?Sized> {
    transcoder: &'a T,
    renditions: Vec<Rendition>,
}

impl<'a, T> TranscodeExecutor<'a, T>
where
    T: Transcoder + ?Sized,
{
    pub fn new(transcoder: &'a T, renditions: Vec<Rendition>) -> Self {
        Self {
            transcoder,
            renditions,
        }
    }

    pub fn plan(&self, job: &Job) -> EncodingPlan {
        EncodingPlan::new(&job.input_path, &job.output_dir, self.renditions.clone())
    }

    /// Transcode the job's scratch input into its scratch output tree.
    pub async fn run(&self, job: &Job) -> Result<EncodingPlan, TranscodeError> {
        let plan = self.plan(job);
        info!(
            input = ?plan.input,
            output = ?plan.output_dir,
            renditions = plan.renditions.len(),
            "transcoding"
        );

        for dir in std::iter::once(plan.output_dir.clone()).chain(plan.variant_dirs()) {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| TranscodeError::Prepare {
                    path: dir.clone(),
                    source: e,
                })?;
        }

        let report = self.transcoder.transcode(&plan).await?;
        debug!(diagnostics = %report.diagnostics, "transcoder output");

        verify_output(&plan).await?;
        info!(output = ?plan.output_dir, "transcoded");
        Ok(plan)
    }
}

async fn read_playlist(path: &Path) -> Result<String, TranscodeError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TranscodeError::IncompleteOutput(format!("cannot read {:?}: {}", path, e)))
}

/// The master playlist must list exactly the planned variants, and every
/// variant playlist and segment it references must be on disk.
pub async fn verify_output(plan: &EncodingPlan) -> Result<(), TranscodeError> {
    let master = read_playlist(&plan.master_playlist_path()).await?;
    let master = MasterPlaylist::parse(&master).map_err(TranscodeError::IncompleteOutput)?;

    let expected = plan.variant_playlists();
    if master.variant_uris() != expected {
        return Err(TranscodeError::IncompleteOutput(format!(
            "master playlist lists {:?}, expected {:?}",
            master.variant_uris(),
            expected
        )));
    }

    for uri in &expected {
        let path = plan.output_dir.join(uri);
        let playlist = MediaPlaylist::parse(&read_playlist(&path).await?)
            .map_err(TranscodeError::IncompleteOutput)?;
        let dir = path.parent().unwrap_or(&plan.output_dir);

        if playlist.segments.is_empty() {
            return Err(TranscodeError::IncompleteOutput(format!(
                "{} has no segments",
                uri
            )));
        }
        for segment in &playlist.segments {
            if !tokio::fs::try_exists(dir.join(&segment.uri))
                .await
                .unwrap_or(false)
            {
                return Err(TranscodeError::IncompleteOutput(format!(
                    "{} references missing segment {}",
                    uri, segment.uri
                )));
            }
        }
    }

    Ok(())
}
