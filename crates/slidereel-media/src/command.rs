//! FFmpeg command builder.

use std::path::{Path, PathBuf};

use crate::gateway::{ToolInvocation, FFMPEG};

const LOG_LEVEL: &str = "error";

/// One `-i` input and the arguments that precede it.
#[derive(Debug, Clone)]
struct FfmpegInput {
    /// Input arguments (before -i)
    args: Vec<String>,
    /// Input file path
    path: PathBuf,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in order
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with a single input.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![FfmpegInput {
                args: Vec::new(),
                path: input.as_ref().to_path_buf(),
            }],
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
        }
    }

    /// Add another input. Subsequent `input_arg` calls apply to it.
    pub fn add_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(FfmpegInput {
            args: Vec::new(),
            path: input.as_ref().to_path_buf(),
        });
        self
    }

    /// Add input arguments (before the most recent -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(input) = self.inputs.last_mut() {
            input.args.push(arg.into());
        }
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(input) = self.inputs.last_mut() {
            input.args.extend(args.into_iter().map(Into::into));
        }
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Loop a still image as the current input.
    pub fn loop_input(self) -> Self {
        self.input_arg("-loop").input_arg("1")
    }

    /// Loop the current input indefinitely.
    pub fn stream_loop_forever(self) -> Self {
        self.input_arg("-stream_loop").input_arg("-1")
    }

    /// Limit the current input's duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.input_arg("-t").input_arg(format_seconds(seconds))
    }

    /// Read the current input with the concat demuxer.
    pub fn concat_demuxer(self) -> Self {
        self.input_args(["-f", "concat", "-safe", "0"])
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set output frame rate.
    pub fn frame_rate(self, fps: u32) -> Self {
        self.output_arg("-r").output_arg(fps.to_string())
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set pixel format.
    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Set audio channel count.
    pub fn audio_channels(self, channels: u32) -> Self {
        self.output_arg("-ac").output_arg(channels.to_string())
    }

    /// Copy every stream without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Drop audio streams.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    /// Map a stream specifier into the output.
    pub fn map(self, stream: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    /// Stop at the end of the shortest stream.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Build the invocation.
    pub fn build(&self) -> ToolInvocation {
        // Always overwrite, only errors on stderr
        let mut inv = ToolInvocation::new(FFMPEG).args(["-y", "-v", LOG_LEVEL]);

        for input in &self.inputs {
            inv = inv.args(&input.args).arg("-i").arg(&input.path);
        }

        inv.args(&self.output_args).arg(&self.output)
    }
}

/// Seconds as FFmpeg expects them: integral values without a fraction.
pub fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{}", seconds as i64)
    } else {
        format!("{:.3}", seconds)
    }
}
