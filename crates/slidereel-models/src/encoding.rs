//! Segment encoding configuration.
//!
//! Every segment is produced with the same resolution, frame rate, codec and
//! pixel format. The assembler relies on that to join segments by stream copy.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Default target width (8K UHD)
pub const DEFAULT_TARGET_WIDTH: u32 = 7680;
/// Default target height (8K UHD)
pub const DEFAULT_TARGET_HEIGHT: u32 = 4320;
/// Default output frame rate
pub const DEFAULT_FPS: u32 = 25;
/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default pixel format (4:2:0 chroma)
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Default audio channel count (stereo)
pub const DEFAULT_AUDIO_CHANNELS: u32 = 2;

/// Encoding parameters shared by every segment and by the audio mux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Target frame width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Target frame height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Target frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Pixel format (e.g., "yuv420p")
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Audio codec used when muxing the soundtrack
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate used when muxing the soundtrack
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Audio channel count used when muxing the soundtrack
    #[serde(default = "default_audio_channels")]
    pub audio_channels: u32,
}

fn default_width() -> u32 {
    DEFAULT_TARGET_WIDTH
}
fn default_height() -> u32 {
    DEFAULT_TARGET_HEIGHT
}
fn default_fps() -> u32 {
    DEFAULT_FPS
}
fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_audio_channels() -> u32 {
    DEFAULT_AUDIO_CHANNELS
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_WIDTH,
            height: DEFAULT_TARGET_HEIGHT,
            fps: DEFAULT_FPS,
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            audio_channels: DEFAULT_AUDIO_CHANNELS,
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new config with an updated target resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Returns a new config with an updated frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Check the configuration describes an encodable output.
    pub fn validate(&self) -> ModelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ModelError::invalid_config(
                "target width/height must be non-zero",
            ));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // yuv420p subsamples chroma by two in both directions
            return Err(ModelError::invalid_config(
                "target width/height must be even",
            ));
        }
        if self.fps == 0 {
            return Err(ModelError::invalid_config("fps must be non-zero"));
        }
        if self.codec.trim().is_empty() || self.pixel_format.trim().is_empty() {
            return Err(ModelError::invalid_config(
                "video codec and pixel format must be set",
            ));
        }
        if self.audio_codec.trim().is_empty() || self.audio_bitrate.trim().is_empty() {
            return Err(ModelError::invalid_config(
                "audio codec and bitrate must be set",
            ));
        }
        if self.audio_channels == 0 {
            return Err(ModelError::invalid_config(
                "audio channel count must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncodingConfig::default();
        assert_eq!(config.width, 7680);
        assert_eq!(config.height, 4320);
        assert_eq!(config.fps, 25);
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.pixel_format, "yuv420p");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_bad_values() {
        assert!(EncodingConfig::default()
            .with_resolution(0, 4320)
            .validate()
            .is_err());
        assert!(EncodingConfig::default()
            .with_resolution(1921, 1080)
            .validate()
            .is_err());
        assert!(EncodingConfig::default().with_fps(0).validate().is_err());

        let mut config = EncodingConfig::default();
        config.audio_channels = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EncodingConfig = serde_json::from_str(r#"{"width": 1920, "height": 1080}"#)
            .expect("partial config parses");
        assert_eq!(config.width, 1920);
        assert_eq!(config.fps, DEFAULT_FPS);
        assert_eq!(config.audio_bitrate, DEFAULT_AUDIO_BITRATE);
    }
}
