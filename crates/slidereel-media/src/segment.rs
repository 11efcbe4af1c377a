//! Per-item segment transcoding.
//!
//! Every segment is written at the same resolution, frame rate, codec and
//! pixel format so the assembler can join them by stream copy.

use std::path::{Path, PathBuf};
use tracing::debug;

use slidereel_models::{labeled_file_name, EncodingConfig, MediaKind, SegmentJob};

use crate::command::FfmpegCommand;
use crate::error::MediaResult;
use crate::filters::scale_pad_filter;
use crate::gateway::{ToolGateway, ToolInvocation, FFMPEG};
use crate::overlay::render_overlay;

/// Settings shared by every segment of a run.
#[derive(Debug, Clone)]
pub struct SegmentSettings {
    pub encoding: EncodingConfig,
    /// Seconds each photo stays on screen
    pub photo_duration_secs: f64,
    /// Directory receiving labeled photos and segments
    pub sandbox_dir: PathBuf,
}

/// Transcode a still image into a fixed-length segment.
pub fn photo_segment_invocation(
    image: &Path,
    output: &Path,
    settings: &SegmentSettings,
) -> ToolInvocation {
    FfmpegCommand::new(image, output)
        .loop_input()
        .duration(settings.photo_duration_secs)
        .video_filter(scale_pad_filter(
            settings.encoding.width,
            settings.encoding.height,
        ))
        .frame_rate(settings.encoding.fps)
        .video_codec(&settings.encoding.codec)
        .pixel_format(&settings.encoding.pixel_format)
        .build()
}

/// Re-encode a video clip to the segment format, dropping its audio.
pub fn video_segment_invocation(
    video: &Path,
    output: &Path,
    settings: &SegmentSettings,
) -> ToolInvocation {
    FfmpegCommand::new(video, output)
        .video_filter(scale_pad_filter(
            settings.encoding.width,
            settings.encoding.height,
        ))
        .frame_rate(settings.encoding.fps)
        .video_codec(&settings.encoding.codec)
        .pixel_format(&settings.encoding.pixel_format)
        .no_audio()
        .build()
}

/// Produce the segment of one job and return its path.
///
/// Photos are captioned first; the captioned copy is what gets transcoded.
pub async fn render_segment<G>(
    gateway: &G,
    job: &SegmentJob,
    settings: &SegmentSettings,
) -> MediaResult<PathBuf>
where
    G: ToolGateway + ?Sized,
{
    let item = job.item();
    let output = job.output_path();

    let invocation = match item.kind() {
        MediaKind::Photo => {
            let labeled = settings.sandbox_dir.join(labeled_file_name(item.index()));
            let overlay = render_overlay(gateway, item.path(), &labeled).await?;
            debug!(
                index = item.index(),
                label = %overlay.label.as_str(),
                "Caption rendered"
            );
            photo_segment_invocation(&overlay.output_path, output, settings)
        }
        MediaKind::Video => video_segment_invocation(item.path(), output, settings),
    };

    gateway.invoke(&invocation).await.into_result(FFMPEG)?;
    Ok(output.to_path_buf())
}
