//! Pipeline configuration.

use std::path::PathBuf;
use std::str::FromStr;

use slidereel_media::{AudioSettings, SegmentSettings};
use slidereel_models::EncodingConfig;

use crate::error::{PipelineError, WorkerResult};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of segment jobs run concurrently
    pub workers: usize,
    /// Seconds each photo stays on screen
    pub time_gap_secs: f64,
    /// Length of the trailing audio fade
    pub fade_out_secs: f64,
    /// Scratch directory name, created inside the media directory
    pub sandbox_dir_name: String,
    /// Silent assembled video
    pub output_path: PathBuf,
    /// Assembled video with soundtrack
    pub audio_output_path: PathBuf,
    /// Accepted soundtrack extensions
    pub audio_extensions: Vec<String>,
    /// Encoding shared by every segment
    pub encoding: EncodingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            time_gap_secs: 5.0,
            fade_out_secs: 5.0,
            sandbox_dir_name: "sandbox".to_string(),
            output_path: PathBuf::from("output.mp4"),
            audio_output_path: PathBuf::from("output_audio.mp4"),
            audio_extensions: vec!["mp3".to_string()],
            encoding: EncodingConfig::default(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl PipelineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            workers: env_parse("SLIDEREEL_WORKERS").unwrap_or(defaults.workers),
            time_gap_secs: env_parse("SLIDEREEL_TIME_GAP").unwrap_or(defaults.time_gap_secs),
            fade_out_secs: env_parse("SLIDEREEL_FADE_OUT").unwrap_or(defaults.fade_out_secs),
            sandbox_dir_name: std::env::var("SLIDEREEL_SANDBOX_DIR")
                .unwrap_or(defaults.sandbox_dir_name),
            output_path: std::env::var("SLIDEREEL_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            audio_output_path: std::env::var("SLIDEREEL_AUDIO_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.audio_output_path),
            audio_extensions: std::env::var("SLIDEREEL_AUDIO_EXTENSIONS")
                .map(|s| parse_extensions(&s))
                .unwrap_or(defaults.audio_extensions),
            encoding: defaults.encoding,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Check the configuration before anything touches the filesystem.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.workers == 0 {
            return Err(PipelineError::config("workers must be at least 1"));
        }
        if !(self.time_gap_secs.is_finite() && self.time_gap_secs > 0.0) {
            return Err(PipelineError::config(format!(
                "time gap must be positive, got {}",
                self.time_gap_secs
            )));
        }
        if !(self.fade_out_secs.is_finite() && self.fade_out_secs >= 0.0) {
            return Err(PipelineError::config(format!(
                "fade-out length must be non-negative, got {}",
                self.fade_out_secs
            )));
        }
        let name = self.sandbox_dir_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(PipelineError::config(format!(
                "sandbox directory name must be a plain name, got {name:?}"
            )));
        }
        if self.audio_extensions.is_empty() {
            return Err(PipelineError::config("at least one audio extension is required"));
        }
        self.encoding
            .validate()
            .map_err(|e| PipelineError::config(e.to_string()))
    }

    /// Sandbox location for a given media directory.
    pub fn sandbox_dir(&self, media_dir: &std::path::Path) -> PathBuf {
        media_dir.join(&self.sandbox_dir_name)
    }

    pub fn segment_settings(&self, sandbox_dir: PathBuf) -> SegmentSettings {
        SegmentSettings {
            encoding: self.encoding.clone(),
            photo_duration_secs: self.time_gap_secs,
            sandbox_dir,
        }
    }

    pub fn audio_settings(&self) -> AudioSettings {
        AudioSettings {
            fade_out_secs: self.fade_out_secs,
            extensions: self.audio_extensions.clone(),
            encoding: self.encoding.clone(),
        }
    }
}

/// Comma-separated extension list, normalised to lowercase without dots.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
