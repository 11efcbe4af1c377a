//! Soundtrack selection and muxing.
//!
//! The soundtrack is written to a second file; the silent assembly is never
//! touched, so a failed mux does not cost a re-transcode.

use rand::prelude::IndexedRandom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use slidereel_models::EncodingConfig;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::filters::fade_out_filter;
use crate::gateway::{ToolGateway, ToolInvocation};
use crate::probe::probe_duration;

/// Settings for the audio attach step.
#[derive(Debug, Clone)]
pub struct AudioSettings {
    /// Length of the trailing fade, in seconds
    pub fade_out_secs: f64,
    /// Accepted track extensions, lowercase, without the dot
    pub extensions: Vec<String>,
    pub encoding: EncodingConfig,
}

/// Why no soundtrack variant was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Duration probe failed or returned a non-positive value
    DurationUnavailable,
    /// The mux invocation exited non-zero
    MuxFailed { output: String },
}

/// Result of the audio attach step.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioOutcome {
    Attached {
        duration: f64,
        track: PathBuf,
        fade_out_start: f64,
    },
    Skipped {
        duration: Option<f64>,
        reason: SkipReason,
    },
}

impl AudioOutcome {
    /// Probed duration of the assembled video, when known.
    pub fn duration(&self) -> Option<f64> {
        match self {
            AudioOutcome::Attached { duration, .. } => Some(*duration),
            AudioOutcome::Skipped { duration, .. } => *duration,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, AudioOutcome::Attached { .. })
    }
}

/// Start of the fade so that it ends exactly at `duration`. Never negative.
pub fn fade_out_start(duration: f64, fade_len: f64) -> f64 {
    (duration - fade_len).max(0.0)
}

/// Regular files of `dir` whose lowercased extension is accepted, sorted.
pub async fn list_audio_candidates(dir: &Path, extensions: &[String]) -> MediaResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| MediaError::directory(dir, format!("cannot read audio directory: {e}")))?;

    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let accepted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)));
        if accepted && fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false) {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Pick one track uniformly at random.
pub async fn pick_audio(dir: &Path, extensions: &[String]) -> MediaResult<PathBuf> {
    let candidates = list_audio_candidates(dir, extensions).await?;
    candidates
        .choose(&mut rand::rng())
        .cloned()
        .ok_or_else(|| MediaError::NoAudioCandidates {
            dir: dir.to_path_buf(),
            extensions: extensions.to_vec(),
        })
}

/// Build the mux invocation: copied video, looped faded audio, shortest wins.
pub fn mux_invocation(
    video: &Path,
    track: &Path,
    output: &Path,
    fade_start: f64,
    settings: &AudioSettings,
) -> ToolInvocation {
    FfmpegCommand::new(video, output)
        .add_input(track)
        .stream_loop_forever()
        .video_codec("copy")
        .map("0:v")
        .map("1:a")
        .audio_codec(&settings.encoding.audio_codec)
        .audio_channels(settings.encoding.audio_channels)
        .audio_bitrate(&settings.encoding.audio_bitrate)
        .audio_filter(fade_out_filter(fade_start, settings.fade_out_secs))
        .shortest()
        .build()
}

/// Probe the assembled video, pick a track and write the soundtrack variant.
///
/// A missing duration or a failed mux is reported as [`AudioOutcome::Skipped`].
/// A missing or empty audio directory is an error.
pub async fn attach_audio<G>(
    gateway: &G,
    video: &Path,
    audio_dir: &Path,
    output: &Path,
    settings: &AudioSettings,
) -> MediaResult<AudioOutcome>
where
    G: ToolGateway + ?Sized,
{
    let duration = match probe_duration(gateway, video).await {
        Ok(d) if d > 0.0 => d,
        Ok(d) => {
            warn!(video = %video.display(), duration = d, "Non-positive duration, skipping audio");
            return Ok(AudioOutcome::Skipped {
                duration: Some(d),
                reason: SkipReason::DurationUnavailable,
            });
        }
        Err(e) => {
            warn!(video = %video.display(), error = %e, "Duration probe failed, skipping audio");
            return Ok(AudioOutcome::Skipped {
                duration: None,
                reason: SkipReason::DurationUnavailable,
            });
        }
    };

    let track = pick_audio(audio_dir, &settings.extensions).await?;
    let fade_start = fade_out_start(duration, settings.fade_out_secs);
    info!(
        track = %track.display(),
        duration,
        fade_out_start = fade_start,
        "Attaching audio"
    );

    let result = gateway
        .invoke(&mux_invocation(video, &track, output, fade_start, settings))
        .await;
    if !result.success() {
        warn!(
            track = %track.display(),
            exit_code = result.exit_code,
            output = %result.output.trim(),
            "Audio mux failed, keeping silent output"
        );
        return Ok(AudioOutcome::Skipped {
            duration: Some(duration),
            reason: SkipReason::MuxFailed {
                output: result.output,
            },
        });
    }

    Ok(AudioOutcome::Attached {
        duration,
        track,
        fade_out_start: fade_start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockToolGateway, ToolOutput};
    use std::ffi::OsStr;
    use tempfile::TempDir;

    fn settings() -> AudioSettings {
        AudioSettings {
            fade_out_secs: 5.0,
            extensions: vec!["mp3".to_string()],
            encoding: EncodingConfig::default(),
        }
    }

    #[test]
    fn test_fade_out_start() {
        assert_eq!(fade_out_start(65.0, 5.0), 60.0);
        assert_eq!(fade_out_start(3.0, 5.0), 0.0);
    }

    #[test]
    fn test_mux_invocation() {
        let inv = mux_invocation(
            Path::new("output.mp4"),
            Path::new("/music/track.mp3"),
            Path::new("output_audio.mp4"),
            60.0,
            &settings(),
        );
        let args: Vec<String> = inv
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-y", "-v", "error", "-i", "output.mp4", "-stream_loop", "-1", "-i",
                "/music/track.mp3", "-c:v", "copy", "-map", "0:v", "-map", "1:a", "-c:a", "aac",
                "-ac", "2", "-b:a", "128k", "-af", "afade=t=out:st=60:d=5", "-shortest",
                "output_audio.mp4"
            ]
        );
    }

    #[tokio::test]
    async fn test_pick_audio_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("song.MP3"), b"x").await.unwrap();
        fs::write(dir.path().join("cover.jpg"), b"x").await.unwrap();
        fs::create_dir(dir.path().join("album.mp3")).await.unwrap();

        let track = pick_audio(dir.path(), &["mp3".to_string()]).await.unwrap();
        assert_eq!(track, dir.path().join("song.MP3"));
    }

    #[tokio::test]
    async fn test_pick_audio_errors() {
        let dir = TempDir::new().unwrap();
        let err = pick_audio(dir.path(), &["mp3".to_string()]).await.unwrap_err();
        assert!(matches!(err, MediaError::NoAudioCandidates { .. }));

        let err = pick_audio(&dir.path().join("missing"), &["mp3".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Directory { .. }));
    }

    #[tokio::test]
    async fn test_attach_audio_muxes_with_fade() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").await.unwrap();

        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .withf(|inv| inv.program() == "ffprobe")
            .times(1)
            .returning(|_| ToolOutput::ok("65.000000\n"));
        gateway
            .expect_invoke()
            .withf(|inv| {
                inv.program() == "ffmpeg"
                    && inv.arg_after("-af") == Some(OsStr::new("afade=t=out:st=60:d=5"))
            })
            .times(1)
            .returning(|_| ToolOutput::ok(""));

        let outcome = attach_audio(
            &gateway,
            Path::new("output.mp4"),
            dir.path(),
            Path::new("output_audio.mp4"),
            &settings(),
        )
        .await
        .unwrap();

        assert!(outcome.is_attached());
        assert_eq!(outcome.duration(), Some(65.0));
    }

    #[tokio::test]
    async fn test_attach_audio_skips_when_duration_unknown() {
        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .withf(|inv| inv.program() == "ffprobe")
            .returning(|_| ToolOutput::ok("N/A"));
        gateway.expect_invoke().withf(|inv| inv.program() == "ffmpeg").never();

        // Audio dir is never read when the duration is unknown
        let outcome = attach_audio(
            &gateway,
            Path::new("output.mp4"),
            Path::new("/nonexistent/audio"),
            Path::new("output_audio.mp4"),
            &settings(),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            AudioOutcome::Skipped {
                duration: None,
                reason: SkipReason::DurationUnavailable
            }
        );
    }

    #[tokio::test]
    async fn test_attach_audio_keeps_non_positive_duration() {
        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .withf(|inv| inv.program() == "ffprobe")
            .returning(|_| ToolOutput::ok("0.000000\n"));
        gateway.expect_invoke().withf(|inv| inv.program() == "ffmpeg").never();

        let outcome = attach_audio(
            &gateway,
            Path::new("output.mp4"),
            Path::new("/nonexistent/audio"),
            Path::new("output_audio.mp4"),
            &settings(),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            AudioOutcome::Skipped {
                duration: Some(0.0),
                reason: SkipReason::DurationUnavailable
            }
        );
    }

    #[tokio::test]
    async fn test_attach_audio_reports_mux_failure_as_skip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").await.unwrap();

        let mut gateway = MockToolGateway::new();
        gateway
            .expect_invoke()
            .withf(|inv| inv.program() == "ffprobe")
            .returning(|_| ToolOutput::ok("12.5"));
        gateway
            .expect_invoke()
            .withf(|inv| inv.program() == "ffmpeg")
            .returning(|_| ToolOutput::new(1, "a.mp3: Invalid data found when processing input"));

        let outcome = attach_audio(
            &gateway,
            Path::new("output.mp4"),
            dir.path(),
            Path::new("output_audio.mp4"),
            &settings(),
        )
        .await
        .unwrap();

        assert!(!outcome.is_attached());
        assert_eq!(outcome.duration(), Some(12.5));
    }
}
