//! Metadata caption overlay for photos.
//!
//! A photo's EXIF data is rendered into a single-line caption and burned onto
//! a copy of the image. The source file is never modified.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use slidereel_models::{ExifMetadata, OverlayLabel};

use crate::error::MediaResult;
use crate::gateway::{ToolGateway, ToolInvocation, CONVERT, IDENTIFY};
use crate::probe::{probe_resolution, Resolution};

/// Caption font.
pub const OVERLAY_FONT: &str = "helvetica";
/// Caption colour.
pub const OVERLAY_FILL: &str = "white";

/// Caption placement derived from image height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeometry {
    /// Downward offset from the vertical centre, `round(0.47 * height)`
    pub y_offset: u32,
    /// Font size, `floor(y_offset / 30)`
    pub point_size: u32,
}

impl OverlayGeometry {
    pub fn for_height(height: u32) -> Self {
        // Integer form of round(0.47 * height), halves round up
        let y_offset = ((47 * u64::from(height) + 50) / 100) as u32;
        Self {
            y_offset,
            point_size: y_offset / 30,
        }
    }
}

/// What was burned onto a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOutcome {
    pub label: OverlayLabel,
    pub resolution: Resolution,
    pub geometry: OverlayGeometry,
    pub output_path: PathBuf,
}

/// Build the ImageMagick invocation listing all EXIF tags as `key=value`.
pub fn metadata_invocation(image_path: &Path) -> ToolInvocation {
    ToolInvocation::new(IDENTIFY)
        .args(["-format", "%[EXIF:*]"])
        .arg(image_path)
}

/// Extract capture metadata and build the caption.
///
/// Extraction failure yields the "metadata unavailable" caption; missing or
/// unparseable fields are rendered as placeholders. Both are logged.
pub async fn extract_label<G>(gateway: &G, image_path: &Path) -> OverlayLabel
where
    G: ToolGateway + ?Sized,
{
    let output = gateway.invoke(&metadata_invocation(image_path)).await;
    if !output.success() {
        warn!(
            image = %image_path.display(),
            exit_code = output.exit_code,
            output = %output.output.trim(),
            "Metadata extraction failed, captioning as unavailable"
        );
        return OverlayLabel::unavailable();
    }

    let label = ExifMetadata::parse(&output.output).label();
    if !label.is_complete() {
        let missing: Vec<&str> = label.unresolved.iter().map(|f| f.key()).collect();
        warn!(
            image = %image_path.display(),
            missing = ?missing,
            "Some metadata fields are missing or unparseable"
        );
    }
    label
}

/// Escape caption text for ImageMagick's `-annotate`.
///
/// Backslash and `%` escapes are neutralised and a leading `@` (read text
/// from file) is escaped.
pub fn escape_annotation(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('%', "%%");
    if escaped.starts_with('@') {
        format!("\\{escaped}")
    } else {
        escaped
    }
}

/// Build the ImageMagick invocation that writes the captioned copy.
pub fn draw_invocation(
    source: &Path,
    destination: &Path,
    label: &OverlayLabel,
    geometry: OverlayGeometry,
) -> ToolInvocation {
    ToolInvocation::new(CONVERT)
        .arg(source)
        .args(["-font", OVERLAY_FONT, "-fill", OVERLAY_FILL])
        .arg("-pointsize")
        .arg(geometry.point_size.to_string())
        .args(["-gravity", "center"])
        .arg("-annotate")
        .arg(format!("+0+{}", geometry.y_offset))
        .arg(escape_annotation(label.as_str()))
        .arg(destination)
}

/// Write a captioned copy of `source` to `destination`.
pub async fn render_overlay<G>(
    gateway: &G,
    source: &Path,
    destination: &Path,
) -> MediaResult<OverlayOutcome>
where
    G: ToolGateway + ?Sized,
{
    let label = extract_label(gateway, source).await;
    let resolution = probe_resolution(gateway, source).await;

    if !resolution.is_known() {
        // (0, 0) yields a zero point size, which ImageMagick draws at its default size
        warn!(
            image = %source.display(),
            "Unknown resolution, drawing caption with zero geometry"
        );
    }

    let geometry = OverlayGeometry::for_height(resolution.height);
    debug!(
        image = %source.display(),
        width = resolution.width,
        height = resolution.height,
        y_offset = geometry.y_offset,
        point_size = geometry.point_size,
        "Drawing caption"
    );

    gateway
        .invoke(&draw_invocation(source, destination, &label, geometry))
        .await
        .into_result(CONVERT)?;

    Ok(OverlayOutcome {
        label,
        resolution,
        geometry,
        output_path: destination.to_path_buf(),
    })
}
