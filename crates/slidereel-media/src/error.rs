//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use slidereel_models::ModelError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    /// External tool exited non-zero or could not be spawned.
    #[error("{tool} failed with exit code {exit_code}: {}", summarize(.output))]
    ToolFailed {
        tool: String,
        exit_code: i32,
        output: String,
    },

    #[error("Metadata parse error: {0}")]
    MetadataParse(String),

    #[error("Directory error for {}: {reason}", .path.display())]
    Directory { path: PathBuf, reason: String },

    #[error("No audio track with extension {extensions:?} in {}", .dir.display())]
    NoAudioCandidates {
        dir: PathBuf,
        extensions: Vec<String>,
    },

    #[error("Concatenation failed: {}", summarize(.output))]
    Assembly { output: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a tool failure error.
    pub fn tool_failed(tool: impl Into<String>, exit_code: i32, output: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            exit_code,
            output: output.into(),
        }
    }

    /// Create a directory error.
    pub fn directory(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Directory {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a metadata parse error.
    pub fn metadata_parse(message: impl Into<String>) -> Self {
        Self::MetadataParse(message.into())
    }

    /// Full tool output attached to the error, if any.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            MediaError::ToolFailed { output, .. } | MediaError::Assembly { output } => {
                Some(output)
            }
            _ => None,
        }
    }
}

/// Last non-empty output line; FFmpeg and ImageMagick put the cause there.
fn summarize(output: &str) -> &str {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failed_display_uses_last_line() {
        let err = MediaError::tool_failed(
            "ffmpeg",
            1,
            "Input #0, image2\n  Stream #0:0: Video: mjpeg\nsegment_000.mp4: No space left on device\n\n",
        );
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg failed with exit code 1"));
        assert!(msg.ends_with("No space left on device"));
        assert!(err.tool_output().unwrap().contains("Stream #0:0"));
    }

    #[test]
    fn test_empty_output_summary() {
        let err = MediaError::Assembly {
            output: String::new(),
        };
        assert_eq!(err.to_string(), "Concatenation failed: no output");
    }
}
