//! Segment job definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::media::MediaItem;

/// Extension of every transcoded segment.
pub const SEGMENT_EXTENSION: &str = "mp4";

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Segment job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting for a worker
    #[default]
    Pending,
    /// Segment was written to its output path
    Done,
    /// Transcoding failed
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deterministic segment file name for an item index.
pub fn segment_file_name(index: usize) -> String {
    format!("segment_{:03}.{}", index, SEGMENT_EXTENSION)
}

/// Deterministic labeled-photo file name for an item index.
pub fn labeled_file_name(index: usize) -> String {
    format!("labeled_{:03}.jpg", index)
}

/// Transcoding job for exactly one media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentJob {
    item: MediaItem,
    output_path: PathBuf,
    status: JobStatus,
}

impl SegmentJob {
    /// Create a pending job writing into `sandbox_dir`.
    pub fn new(item: MediaItem, sandbox_dir: &Path) -> Self {
        let output_path = sandbox_dir.join(segment_file_name(item.index()));
        Self {
            item,
            output_path,
            status: JobStatus::Pending,
        }
    }

    pub fn item(&self) -> &MediaItem {
        &self.item
    }

    pub fn index(&self) -> usize {
        self.item.index()
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Mark the job as finished successfully.
    pub fn complete(mut self) -> Self {
        self.status = JobStatus::Done;
        self
    }

    /// Mark the job as failed.
    pub fn fail(mut self) -> Self {
        self.status = JobStatus::Failed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_is_keyed_by_index() {
        let item = MediaItem::new("/media/clip.mov", 12).unwrap();
        let job = SegmentJob::new(item, Path::new("/media/sandbox"));
        assert_eq!(job.output_path(), Path::new("/media/sandbox/segment_012.mp4"));
        assert_eq!(job.status(), JobStatus::Pending);
    }

    #[test]
    fn test_status_transitions() {
        let item = MediaItem::new("/media/a.jpg", 0).unwrap();
        let job = SegmentJob::new(item, Path::new("/tmp"));
        let done = job.clone().complete();
        assert_eq!(done.status(), JobStatus::Done);
        assert!(done.status().is_terminal());
        assert_eq!(job.fail().status(), JobStatus::Failed);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(segment_file_name(3), "segment_003.mp4");
        assert_eq!(labeled_file_name(1000), "labeled_1000.jpg");
    }
}
