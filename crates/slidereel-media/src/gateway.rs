//! Single entry point for running external tools.
//!
//! Every FFmpeg, FFprobe and ImageMagick call goes through a [`ToolGateway`].
//! Commands are pre-tokenized argument vectors; nothing is ever handed to a
//! shell, so file names and metadata cannot change how a command is parsed.

use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Exit code reported when the process could not be started at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// Program names of the external tools the pipeline depends on.
pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";
pub const IDENTIFY: &str = "identify";
pub const CONVERT: &str = "convert";

/// Tools the pipeline cannot run without.
pub const REQUIRED_TOOLS: &[&str] = &[FFMPEG, FFPROBE, IDENTIFY, CONVERT];

/// A program and its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: String,
    args: Vec<OsString>,
}

impl ToolInvocation {
    /// Create an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Whether any argument equals `value`.
    pub fn has_arg(&self, value: impl AsRef<OsStr>) -> bool {
        let value = value.as_ref();
        self.args.iter().any(|a| a == value)
    }

    /// Argument following the first occurrence of `flag`.
    pub fn arg_after(&self, flag: impl AsRef<OsStr>) -> Option<&OsStr> {
        let flag = flag.as_ref();
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|pos| self.args.get(pos + 1))
            .map(OsString::as_os_str)
    }

    /// Final argument (the output path for FFmpeg and ImageMagick).
    pub fn last_arg(&self) -> Option<&OsStr> {
        self.args.last().map(OsString::as_os_str)
    }
}

impl fmt::Display for ToolInvocation {
    /// Lossy, space-joined rendering for logs only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status and combined stdout + stderr of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub output: String,
}

impl ToolOutput {
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// Successful run with the given output.
    pub fn ok(output: impl Into<String>) -> Self {
        Self::new(0, output)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Convert a non-zero exit into [`MediaError::ToolFailed`].
    pub fn into_result(self, tool: &str) -> MediaResult<String> {
        if self.success() {
            Ok(self.output)
        } else {
            Err(MediaError::tool_failed(tool, self.exit_code, self.output))
        }
    }
}

/// Executes external commands.
///
/// Implementations never retry and never time out; the caller decides how
/// severe a non-zero exit is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Run the invocation to completion.
    async fn invoke(&self, invocation: &ToolInvocation) -> ToolOutput;
}

/// Gateway backed by real child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessGateway;

impl ProcessGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolGateway for ProcessGateway {
    async fn invoke(&self, invocation: &ToolInvocation) -> ToolOutput {
        debug!(tool = invocation.program(), "Running: {}", invocation);

        let result = Command::new(invocation.program())
            .args(invocation.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match result {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                // Terminated by a signal: no exit code
                let exit_code = output.status.code().unwrap_or(SPAWN_FAILURE_EXIT_CODE);
                ToolOutput::new(exit_code, combined)
            }
            Err(e) => ToolOutput::new(
                SPAWN_FAILURE_EXIT_CODE,
                format!("failed to spawn {}: {}", invocation.program(), e),
            ),
        }
    }
}

/// Check a single tool is resolvable on PATH.
pub fn check_tool(tool: &str) -> MediaResult<PathBuf> {
    which::which(tool).map_err(|_| MediaError::ToolNotFound(tool.to_string()))
}
