use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;

use crate::foundation::{
    error::{SlidecastError, SlidecastResult},
    process::run_tool,
};

/// Join `inputs` in order into `out` without re-encoding.
///
/// A concat-demuxer manifest is written next to `out` (see [`manifest_path_for`]) and removed
/// again whether or not `ffmpeg` succeeds.
#[tracing::instrument(skip(ffmpeg, inputs), fields(inputs = inputs.len()))]
pub fn concat_segments(ffmpeg: &Path, inputs: &[PathBuf], out: &Path) -> SlidecastResult<()> {
    if inputs.len() < 2 {
        return Err(SlidecastError::validation(format!(
            "concatenation needs at least two inputs, got {}",
            inputs.len()
        )));
    }

    let manifest = Manifest::write(&manifest_path_for(out), inputs)?;

    let mut cmd = Command::new(ffmpeg);
    cmd.args(["-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(manifest.path())
        .args(["-c", "copy", "-y"])
        .arg(out);
    run_tool(cmd, SlidecastError::concat)?;
    Ok(())
}

/// `<out stem>_concat_list.txt` beside `out`, so merges into different outputs never share a
/// manifest.
pub fn manifest_path_for(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    out.with_file_name(format!("{stem}_concat_list.txt"))
}

/// Concat-demuxer list file, deleted on drop.
struct Manifest {
    path: PathBuf,
}

impl Manifest {
    fn write(path: &Path, inputs: &[PathBuf]) -> SlidecastResult<Self> {
        let mut body = String::new();
        for input in inputs {
            let abs = std::path::absolute(input)
                .with_context(|| format!("failed to resolve '{}'", input.display()))?;
            body.push_str(&manifest_line(&abs));
            body.push('\n');
        }

        let mut f = std::fs::File::create(path)
            .with_context(|| format!("failed to create concat manifest '{}'", path.display()))?;
        // Guard first so a failed write still removes the file.
        let manifest = Self {
            path: path.to_path_buf(),
        };
        f.write_all(body.as_bytes())
            .with_context(|| format!("failed to write concat manifest '{}'", path.display()))?;
        Ok(manifest)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Manifest {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove concat manifest"
            );
        }
    }
}

/// `file '<path>'`, with embedded single quotes escaped the way the concat demuxer expects.
fn manifest_line(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'")
}
