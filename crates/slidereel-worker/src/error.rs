//! Pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

use slidereel_media::MediaError;

pub type WorkerResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A segment job failed; the run aborts before assembly.
    #[error("Job {index} ({}) failed: {source}", .source_path.display())]
    JobFailed {
        index: usize,
        source_path: PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("No segment produced for item {index}")]
    MissingSegment { index: usize },

    #[error("Directory error for {}: {reason}", .path.display())]
    Directory { path: PathBuf, reason: String },

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn job_failed(index: usize, source_path: impl Into<PathBuf>, source: MediaError) -> Self {
        Self::JobFailed {
            index,
            source_path: source_path.into(),
            source,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Directory {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Full external tool output behind this error, if any.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            PipelineError::JobFailed { source, .. } | PipelineError::Media(source) => {
                source.tool_output()
            }
            _ => None,
        }
    }
}

/// Directory and concatenation failures keep their own pipeline variants.
pub(crate) fn classify(err: MediaError) -> PipelineError {
    match err {
        MediaError::Directory { path, reason } => PipelineError::Directory { path, reason },
        MediaError::NoAudioCandidates { dir, extensions } => PipelineError::Directory {
            path: dir,
            reason: format!("no audio track with extension {extensions:?}"),
        },
        MediaError::Assembly { output } => PipelineError::Assembly(output),
        other => PipelineError::Media(other),
    }
}
