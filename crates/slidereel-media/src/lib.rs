#![deny(unreachable_patterns)]
//! External-tool plumbing for the slidereel pipeline.
//!
//! This crate provides:
//! - A single gateway through which FFmpeg, FFprobe and ImageMagick are run
//! - Type-safe FFmpeg command building
//! - Media directory scanning
//! - EXIF caption overlay for photos
//! - Per-item segment transcoding
//! - Lossless concatenation and soundtrack muxing

pub mod audio;
pub mod command;
pub mod concat;
pub mod error;
pub mod filters;
pub mod gateway;
pub mod inventory;
pub mod overlay;
pub mod probe;
pub mod segment;

pub use audio::{attach_audio, fade_out_start, pick_audio, AudioOutcome, AudioSettings, SkipReason};
pub use command::FfmpegCommand;
pub use concat::{assemble, CONCAT_LIST_FILE};
pub use error::{MediaError, MediaResult};
pub use gateway::{
    check_tool, ProcessGateway, ToolGateway, ToolInvocation, ToolOutput,
    REQUIRED_TOOLS,
};
pub use inventory::scan_media_dir;
pub use overlay::{render_overlay, OverlayGeometry, OverlayOutcome};
pub use probe::{probe_duration, probe_resolution, Resolution};
pub use segment::{render_segment, SegmentSettings};
