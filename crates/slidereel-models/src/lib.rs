//! Shared data models for the slidereel pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Media items and their photo/video classification
//! - Segment jobs and run identifiers
//! - EXIF capture metadata and the overlay caption built from it
//! - Encoding configuration shared by every segment
//! - Assembly descriptors and pipeline results

pub mod assembly;
pub mod encoding;
pub mod error;
pub mod exif;
pub mod job;
pub mod media;

// Re-export common types
pub use assembly::{AssemblyDescriptor, PipelineResult};
pub use encoding::EncodingConfig;
pub use error::{ModelError, ModelResult};
pub use exif::{parse_fraction, ExifField, ExifMetadata, OverlayLabel};
pub use job::{labeled_file_name, segment_file_name, JobStatus, RunId, SegmentJob};
pub use media::{MediaItem, MediaKind};
