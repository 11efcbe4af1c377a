//! End-to-end run: scan, transcode, assemble, score.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use slidereel_media::{assemble, attach_audio, scan_media_dir, ToolGateway, CONCAT_LIST_FILE};
use slidereel_models::{PipelineResult, RunId, SegmentJob};

use crate::config::PipelineConfig;
use crate::error::{classify, PipelineError, WorkerResult};
use crate::executor::{CancelToken, SegmentWorkerPool};
use crate::workspace::{ensure_media_dir, remove_stale_outputs, reset_sandbox, resolve_media_dir};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The media directory held no supported files
    NothingToDo,
    Completed(PipelineResult),
}

/// The slideshow pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    gateway: Arc<dyn ToolGateway>,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, gateway: Arc<dyn ToolGateway>) -> Self {
        Self {
            config,
            gateway,
            cancel: CancelToken::new(),
        }
    }

    /// Share an externally owned cancellation flag (e.g. raised on Ctrl-C).
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the pipeline over `media_dir`, scoring with a track from `audio_dir`.
    pub async fn run(&self, media_dir: &Path, audio_dir: &Path) -> WorkerResult<RunOutcome> {
        let run_id = RunId::new();
        let span = info_span!("run", run_id = %run_id);
        self.execute(media_dir, audio_dir).instrument(span).await
    }

    async fn execute(&self, media_dir: &Path, audio_dir: &Path) -> WorkerResult<RunOutcome> {
        self.config.validate()?;
        info!(
            media_dir = %media_dir.display(),
            audio_dir = %audio_dir.display(),
            workers = self.config.workers,
            "Run started"
        );

        ensure_media_dir(media_dir).await?;
        let media_dir = &resolve_media_dir(media_dir).await?;
        let sandbox = reset_sandbox(&self.config.sandbox_dir(media_dir)).await?;
        remove_stale_outputs(&[
            self.config.output_path.as_path(),
            self.config.audio_output_path.as_path(),
        ])
        .await?;

        let items = scan_media_dir(media_dir).await.map_err(classify)?;
        if items.is_empty() {
            info!(media_dir = %media_dir.display(), "No supported media found");
            return Ok(RunOutcome::NothingToDo);
        }
        let photos = items.iter().filter(|i| i.is_photo()).count();
        info!(items = items.len(), photos, videos = items.len() - photos, "Media scanned");

        let jobs: Vec<SegmentJob> = items
            .into_iter()
            .map(|item| SegmentJob::new(item, &sandbox))
            .collect();

        let pool = SegmentWorkerPool::new(
            Arc::clone(&self.gateway),
            self.config.segment_settings(sandbox.clone()),
            self.config.workers,
            self.cancel.clone(),
        );
        let descriptor = pool.run(jobs).await?;

        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let output_path = &self.config.output_path;
        assemble(
            self.gateway.as_ref(),
            &descriptor,
            &sandbox.join(CONCAT_LIST_FILE),
            output_path,
        )
        .await
        .map_err(classify)?;

        let audio_output_path = &self.config.audio_output_path;
        let audio = attach_audio(
            self.gateway.as_ref(),
            output_path,
            audio_dir,
            audio_output_path,
            &self.config.audio_settings(),
        )
        .await
        .map_err(classify)?;

        let audio_attached = audio.is_attached();
        let result = PipelineResult {
            assembled_path: output_path.clone(),
            segment_count: descriptor.len(),
            final_duration: audio.duration(),
            audio_attached,
            audio_path: audio_attached.then(|| audio_output_path.clone()),
        };
        info!(
            segments = result.segment_count,
            audio_attached,
            "Run completed"
        );
        Ok(RunOutcome::Completed(result))
    }
}
