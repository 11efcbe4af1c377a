//! Scratch workspace for intermediate files.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{PipelineError, WorkerResult};

/// Check that the media directory exists and is a directory.
pub async fn ensure_media_dir(media_dir: &Path) -> WorkerResult<()> {
    match fs::metadata(media_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PipelineError::directory(media_dir, "not a directory")),
        Err(e) => Err(PipelineError::directory(
            media_dir,
            format!("media directory unavailable: {e}"),
        )),
    }
}

/// Absolute form of the media directory.
///
/// Segment paths derive from it and the concat list needs them absolute.
pub async fn resolve_media_dir(media_dir: &Path) -> WorkerResult<PathBuf> {
    fs::canonicalize(media_dir).await.map_err(|e| {
        PipelineError::directory(media_dir, format!("cannot resolve media directory: {e}"))
    })
}

/// Delete outputs left by an earlier run so a failed run leaves none behind.
pub async fn remove_stale_outputs(outputs: &[&Path]) -> WorkerResult<()> {
    for output in outputs {
        match fs::remove_file(output).await {
            Ok(()) => debug!(output = %output.display(), "Removed previous output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(PipelineError::directory(
                    *output,
                    format!("cannot remove previous output: {e}"),
                ))
            }
        }
    }
    Ok(())
}

/// Remove any previous sandbox and create an empty one.
///
/// Leftovers from an earlier run are never reused.
pub async fn reset_sandbox(sandbox_dir: &Path) -> WorkerResult<PathBuf> {
    match fs::remove_dir_all(sandbox_dir).await {
        Ok(()) => debug!(sandbox = %sandbox_dir.display(), "Removed previous sandbox"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(PipelineError::directory(
                sandbox_dir,
                format!("cannot remove previous sandbox: {e}"),
            ))
        }
    }

    fs::create_dir_all(sandbox_dir).await.map_err(|e| {
        PipelineError::directory(sandbox_dir, format!("cannot create sandbox: {e}"))
    })?;
    info!(sandbox = %sandbox_dir.display(), "Sandbox ready");
    Ok(sandbox_dir.to_path_buf())
}
