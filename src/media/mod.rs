//! Media operations backed by the system `ffmpeg` / `ffprobe` binaries.
//!
//! The tools run as subprocesses; no FFmpeg headers or libraries are linked.

use std::path::{Path, PathBuf};

use crate::foundation::error::SlidecastResult;

/// Stream-copy concatenation through the concat demuxer.
pub mod concat;
/// Attach narration audio to a silent video.
pub mod mux;
/// Duration probing via `ffprobe`.
pub mod probe;
/// Still image to fixed-length clip.
pub mod segment;

pub const FFMPEG_ENV: &str = "SLIDECAST_FFMPEG";
pub const FFPROBE_ENV: &str = "SLIDECAST_FFPROBE";

/// The four external media operations the pipeline depends on.
///
/// Every method blocks until the underlying tool exits.
pub trait MediaTools {
    /// Duration of `path` in seconds.
    fn probe_duration(&self, path: &Path) -> SlidecastResult<f64>;
    /// Loop `image` into a silent clip of `duration_sec` at `out`.
    fn render_segment(&self, image: &Path, duration_sec: f64, out: &Path) -> SlidecastResult<()>;
    /// Losslessly join `inputs` (at least two, same codec parameters) in order into `out`.
    fn concat(&self, inputs: &[PathBuf], out: &Path) -> SlidecastResult<()>;
    /// Copy the video stream of `video`, encode `audio` alongside it, trimmed to the shorter.
    fn mux(&self, video: &Path, audio: &Path, out: &Path) -> SlidecastResult<()>;
}

/// [`MediaTools`] implemented with `ffmpeg` and `ffprobe` subprocesses.
#[derive(Clone, Debug)]
pub struct FfmpegTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegTools {
    /// Binaries from `SLIDECAST_FFMPEG` / `SLIDECAST_FFPROBE`, else the names on `PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(PathBuf::from))
    }

    pub(crate) fn from_lookup(env: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let defaults = Self::default();
        let pick = |key: &str, fallback: PathBuf| {
            env(key)
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(fallback)
        };
        Self {
            ffmpeg: pick(FFMPEG_ENV, defaults.ffmpeg),
            ffprobe: pick(FFPROBE_ENV, defaults.ffprobe),
        }
    }

    /// `true` when both binaries respond to `-version`.
    pub fn is_available(&self) -> bool {
        crate::foundation::process::is_tool_available(&self.ffmpeg)
            && crate::foundation::process::is_tool_available(&self.ffprobe)
    }
}

impl MediaTools for FfmpegTools {
    fn probe_duration(&self, path: &Path) -> SlidecastResult<f64> {
        probe::probe_duration(&self.ffprobe, path)
    }

    fn render_segment(&self, image: &Path, duration_sec: f64, out: &Path) -> SlidecastResult<()> {
        segment::render_segment(&self.ffmpeg, image, duration_sec, out)
    }

    fn concat(&self, inputs: &[PathBuf], out: &Path) -> SlidecastResult<()> {
        concat::concat_segments(&self.ffmpeg, inputs, out)
    }

    fn mux(&self, video: &Path, audio: &Path, out: &Path) -> SlidecastResult<()> {
        mux::mux_audio(&self.ffmpeg, video, audio, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_tool_paths() {
        let tools = FfmpegTools::from_lookup(|key| match key {
            FFMPEG_ENV => Some(PathBuf::from("/opt/ff/bin/ffmpeg")),
            _ => None,
        });
        assert_eq!(tools.ffmpeg, PathBuf::from("/opt/ff/bin/ffmpeg"));
        assert_eq!(tools.ffprobe, PathBuf::from("ffprobe"));
    }

    #[test]
    fn empty_override_falls_back_to_path_lookup() {
        let tools = FfmpegTools::from_lookup(|_| Some(PathBuf::new()));
        assert_eq!(tools.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(tools.ffprobe, PathBuf::from("ffprobe"));
    }
}
