//! Assembly inputs and the final pipeline result.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordered list of segment paths handed to the assembler.
///
/// Entry `i` is the segment of the media item with index `i`; the list has no
/// gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyDescriptor {
    segments: Vec<PathBuf>,
}

impl AssemblyDescriptor {
    /// Build from index-addressed slots. Returns the first empty index on a gap.
    pub fn from_slots<I>(slots: I) -> Result<Self, usize>
    where
        I: IntoIterator<Item = Option<PathBuf>>,
    {
        let mut segments = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(path) => segments.push(path),
                None => return Err(index),
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathBuf] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render the concat demuxer list (`file '<path>'` per line).
    ///
    /// Single quotes inside a path are closed, escaped and reopened (`'\''`).
    pub fn to_concat_list(&self) -> String {
        self.segments
            .iter()
            .map(|path| format!("file '{}'\n", escape_concat_path(path)))
            .collect()
    }
}

fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Silent assembled video
    pub assembled_path: PathBuf,
    /// Number of segments joined
    pub segment_count: usize,
    /// Probed duration of the assembled video in seconds
    pub final_duration: Option<f64>,
    /// Whether the soundtrack variant was written
    pub audio_attached: bool,
    /// Soundtrack variant, present when `audio_attached`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slots_keeps_order() {
        let descriptor = AssemblyDescriptor::from_slots(vec![
            Some(PathBuf::from("/s/segment_000.mp4")),
            Some(PathBuf::from("/s/segment_001.mp4")),
        ])
        .unwrap();
        assert_eq!(descriptor.len(), 2);
        assert_eq!(descriptor.segments()[1], PathBuf::from("/s/segment_001.mp4"));
    }

    #[test]
    fn test_from_slots_reports_gap() {
        let gap = AssemblyDescriptor::from_slots(vec![
            Some(PathBuf::from("/s/segment_000.mp4")),
            None,
            Some(PathBuf::from("/s/segment_002.mp4")),
        ])
        .unwrap_err();
        assert_eq!(gap, 1);
    }

    #[test]
    fn test_concat_list() {
        let descriptor = AssemblyDescriptor::from_slots(vec![
            Some(PathBuf::from("/s/segment_000.mp4")),
            Some(PathBuf::from("/it's/segment_001.mp4")),
        ])
        .unwrap();
        assert_eq!(
            descriptor.to_concat_list(),
            "file '/s/segment_000.mp4'\nfile '/it'\\''s/segment_001.mp4'\n"
        );
    }

    #[test]
    fn test_result_serializes_without_missing_audio() {
        let result = PipelineResult {
            assembled_path: PathBuf::from("output.mp4"),
            segment_count: 3,
            final_duration: Some(15.0),
            audio_attached: false,
            audio_path: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["segment_count"], 3);
        assert!(json.get("audio_path").is_none());
    }
}
