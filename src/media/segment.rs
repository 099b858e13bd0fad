use std::{ffi::OsString, path::Path, process::Command};

use crate::foundation::{
    error::{SlidecastError, SlidecastResult},
    process::run_tool,
};

// yuv420p needs even dimensions; round each side down.
const EVEN_SCALE: &str = "scale=trunc(iw/2)*2:trunc(ih/2)*2";

/// Render `image` as a silent H.264 clip lasting `duration_sec`.
#[tracing::instrument(skip(ffmpeg))]
pub fn render_segment(
    ffmpeg: &Path,
    image: &Path,
    duration_sec: f64,
    out: &Path,
) -> SlidecastResult<()> {
    if !duration_sec.is_finite() || duration_sec <= 0.0 {
        return Err(SlidecastError::validation(format!(
            "segment duration must be positive, got {duration_sec}"
        )));
    }

    let mut cmd = Command::new(ffmpeg);
    cmd.args(segment_args(image, duration_sec, out));
    run_tool(cmd, SlidecastError::render)?;
    Ok(())
}

fn segment_args(image: &Path, duration_sec: f64, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-loglevel", "error", "-loop", "1", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(image.as_os_str().to_owned());
    args.extend(
        [
            "-vf",
            EVEN_SCALE,
            "-c:v",
            "libx264",
            "-tune",
            "stillimage",
            "-pix_fmt",
            "yuv420p",
            "-t",
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(OsString::from(format!("{duration_sec:.6}")));
    args.push(OsString::from("-y"));
    args.push(out.as_os_str().to_owned());
    args
}
