//! Structured item logging utilities.
//!
//! Provides consistent, structured logging for segment jobs with
//! tracing spans and contextual information.

use tracing::{error, info, Span};

use slidereel_models::MediaItem;

/// Item logger for structured logging with consistent formatting.
///
/// Every event carries the item index and source file name, so interleaved
/// output from concurrent workers can still be attributed.
#[derive(Debug, Clone)]
pub struct ItemLogger {
    index: usize,
    source: String,
    kind: &'static str,
}

impl ItemLogger {
    /// Create a new logger for one media item.
    pub fn new(item: &MediaItem) -> Self {
        Self {
            index: item.index(),
            source: item.file_name(),
            kind: item.kind().as_str(),
        }
    }

    /// Log the start of a segment job.
    pub fn log_start(&self, worker: usize) {
        info!(
            index = self.index,
            source = %self.source,
            kind = self.kind,
            worker,
            "Segment job started"
        );
    }

    /// Log a failed job, including the tool output when there is one.
    pub fn log_error(&self, error: &dyn std::fmt::Display, tool_output: Option<&str>) {
        error!(
            index = self.index,
            source = %self.source,
            error = %error,
            tool_output = tool_output.map(str::trim).unwrap_or(""),
            "Segment job failed"
        );
    }

    /// Log the completion of a job.
    pub fn log_completion(&self, segment: &std::path::Path) {
        info!(
            index = self.index,
            source = %self.source,
            segment = %segment.display(),
            "Segment job completed"
        );
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Create a tracing span for this item.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "segment",
            index = self.index,
            source = %self.source
        )
    }
}
