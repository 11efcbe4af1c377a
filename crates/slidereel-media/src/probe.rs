//! Duration and resolution probes.

use std::path::Path;
use tracing::warn;

use crate::error::{MediaError, MediaResult};
use crate::gateway::{ToolGateway, ToolInvocation, FFPROBE, IDENTIFY};

/// Image dimensions in pixels. `(0, 0)` when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Build the FFprobe invocation printing only the container duration.
pub fn duration_invocation(video_path: &Path) -> ToolInvocation {
    ToolInvocation::new(FFPROBE)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(video_path)
}

/// Get video duration in seconds.
pub async fn probe_duration<G>(gateway: &G, video_path: &Path) -> MediaResult<f64>
where
    G: ToolGateway + ?Sized,
{
    let output = gateway
        .invoke(&duration_invocation(video_path))
        .await
        .into_result(FFPROBE)?;
    parse_duration(&output)
}

/// Parse FFprobe's bare duration output.
pub fn parse_duration(output: &str) -> MediaResult<f64> {
    let trimmed = output.trim();
    trimmed
        .lines()
        .map(str::trim)
        .find_map(|line| line.parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .ok_or_else(|| MediaError::metadata_parse(format!("unparseable duration: {trimmed:?}")))
}

/// Build the ImageMagick invocation printing `width:height`.
pub fn resolution_invocation(image_path: &Path) -> ToolInvocation {
    ToolInvocation::new(IDENTIFY)
        .args(["-format", "%w:%h"])
        .arg(image_path)
}

/// Probe image resolution. Never fails: any problem yields `(0, 0)`.
pub async fn probe_resolution<G>(gateway: &G, image_path: &Path) -> Resolution
where
    G: ToolGateway + ?Sized,
{
    let output = gateway.invoke(&resolution_invocation(image_path)).await;
    if !output.success() {
        warn!(
            image = %image_path.display(),
            exit_code = output.exit_code,
            output = %output.output.trim(),
            "Resolution probe failed, using 0x0"
        );
        return Resolution::default();
    }

    match parse_resolution(&output.output) {
        Ok(resolution) => resolution,
        Err(e) => {
            warn!(image = %image_path.display(), error = %e, "Resolution probe output unusable, using 0x0");
            Resolution::default()
        }
    }
}

/// Parse `width:height` from the last line that contains a colon.
///
/// Warnings printed by ImageMagick before the answer are skipped.
pub fn parse_resolution(output: &str) -> MediaResult<Resolution> {
    let line = output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.contains(':'))
        .ok_or_else(|| MediaError::metadata_parse(format!("no width:height in {output:?}")))?;

    let (w, h) = line
        .split_once(':')
        .ok_or_else(|| MediaError::metadata_parse(format!("no width:height in {line:?}")))?;
    let width = w.trim().parse::<u32>();
    let height = h.trim().parse::<u32>();
    match (width, height) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => Ok(Resolution::new(width, height)),
        _ => Err(MediaError::metadata_parse(format!("invalid resolution {line:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockToolGateway, ToolOutput};

    #[test]
    fn test_parse_duration() {
        assert!((parse_duration("65.040000\n").unwrap() - 65.04).abs() < 1e-9);
        assert!(parse_duration("N/A").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("6000:4000").unwrap(), Resolution::new(6000, 4000));
        assert_eq!(
            parse_resolution("identify: Unknown field with tag 42034\n4032:3024").unwrap(),
            Resolution::new(4032, 3024)
        );
        assert!(parse_resolution("").is_err());
        assert!(parse_resolution("0:100").is_err());
        assert!(parse_resolution("-5:100").is_err());
        assert!(parse_resolution("abc:def").is_err());
    }

    #[tokio::test]
    async fn test_probe_resolution_falls_back_on_failure() {
        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .times(1)
            .returning(|_| ToolOutput::new(1, "identify: unable to open image"));

        let resolution = probe_resolution(&gateway, Path::new("/photos/broken.jpg")).await;
        assert_eq!(resolution, Resolution::new(0, 0));
        assert!(!resolution.is_known());
    }

    #[tokio::test]
    async fn test_probe_resolution_falls_back_on_garbage() {
        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .returning(|_| ToolOutput::ok("not a resolution"));

        let resolution = probe_resolution(&gateway, Path::new("/photos/odd.jpg")).await;
        assert_eq!(resolution, Resolution::default());
    }

    #[tokio::test]
    async fn test_probe_duration_uses_ffprobe() {
        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .withf(|inv| inv.program() == "ffprobe" && inv.has_arg("format=duration"))
            .returning(|_| ToolOutput::ok("65.000000\n"));

        let duration = probe_duration(&gateway, Path::new("output.mp4")).await.unwrap();
        assert_eq!(duration, 65.0);
    }

    #[tokio::test]
    async fn test_probe_duration_reports_tool_failure() {
        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .returning(|_| ToolOutput::new(1, "output.mp4: No such file or directory"));

        let err = probe_duration(&gateway, Path::new("output.mp4")).await.unwrap_err();
        assert!(matches!(err, MediaError::ToolFailed { .. }));
    }
}
