use std::{path::Path, process::Command};

use crate::foundation::{
    error::{SlidecastError, SlidecastResult},
    process::run_tool,
};

pub const AUDIO_BITRATE: &str = "192k";

/// Copy the video stream of `video` and add `audio` as AAC; output stops at the shorter input.
#[tracing::instrument(skip(ffmpeg))]
pub fn mux_audio(ffmpeg: &Path, video: &Path, audio: &Path, out: &Path) -> SlidecastResult<()> {
    let mut cmd = Command::new(ffmpeg);
    cmd.args(["-loglevel", "error", "-i"])
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-b:a",
            AUDIO_BITRATE,
            "-shortest",
            "-movflags",
            "+faststart",
            "-y",
        ])
        .arg(out);
    run_tool(cmd, SlidecastError::mux)?;
    Ok(())
}
