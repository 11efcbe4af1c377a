//! Lossless concatenation of segments.

use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use slidereel_models::AssemblyDescriptor;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::gateway::{ToolGateway, ToolInvocation};

/// File name of the concat demuxer list inside the sandbox.
pub const CONCAT_LIST_FILE: &str = "concat_list.txt";

/// Build the stream-copy concatenation invocation.
pub fn concat_invocation(list_path: &Path, output_path: &Path) -> ToolInvocation {
    FfmpegCommand::new(list_path, output_path)
        .concat_demuxer()
        .stream_copy()
        .build()
}

/// Join the descriptor's segments, in order, into `output_path`.
///
/// The list file is written to `list_path` and any previous output is removed
/// first. Segments share one encoding, so streams are copied as-is.
pub async fn assemble<G>(
    gateway: &G,
    descriptor: &AssemblyDescriptor,
    list_path: &Path,
    output_path: &Path,
) -> MediaResult<()>
where
    G: ToolGateway + ?Sized,
{
    if descriptor.is_empty() {
        return Err(MediaError::Assembly {
            output: "no segments to concatenate".to_string(),
        });
    }

    fs::write(list_path, descriptor.to_concat_list()).await?;
    debug!(list = %list_path.display(), segments = descriptor.len(), "Wrote concat list");

    match fs::remove_file(output_path).await {
        Ok(()) => debug!(output = %output_path.display(), "Removed stale output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let output = gateway
        .invoke(&concat_invocation(list_path, output_path))
        .await;
    if !output.success() {
        return Err(MediaError::Assembly {
            output: output.output,
        });
    }

    info!(
        output = %output_path.display(),
        segments = descriptor.len(),
        "Segments concatenated"
    );
    Ok(())
}
