use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        error::{SlidecastError, SlidecastResult},
        process::ensure_parent_dir,
    },
    media::MediaTools,
};

/// Losslessly join existing videos, in the order given, into `output`.
///
/// Inputs must share codec parameters; this is the concat step of `generate` on its own.
#[tracing::instrument(skip(media, inputs), fields(inputs = inputs.len()))]
pub fn merge_videos(
    media: &dyn MediaTools,
    inputs: &[PathBuf],
    output: &Path,
) -> SlidecastResult<()> {
    if inputs.len() < 2 {
        return Err(SlidecastError::validation(format!(
            "merging needs at least two input videos, got {}",
            inputs.len()
        )));
    }
    if let Some(missing) = inputs.iter().find(|p| !p.is_file()) {
        return Err(SlidecastError::validation(format!(
            "input video '{}' does not exist",
            missing.display()
        )));
    }

    ensure_parent_dir(output)?;
    media.concat(inputs, output)?;
    tracing::info!(output = %output.display(), "merged {} videos", inputs.len());
    Ok(())
}
