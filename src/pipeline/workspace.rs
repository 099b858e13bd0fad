use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::foundation::error::SlidecastResult;

pub const DEFAULT_TEMP_DIR_NAME: &str = "temp";
pub const DEFAULT_AUDIO_FILE_NAME: &str = "audio.mp3";
pub const MERGED_FILE_NAME: &str = "merged_video.mp4";

/// Directory holding the intermediates of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `temp_dir` when given, else a `temp` directory beside the output video.
    pub fn for_output(output_video: &Path, temp_dir: Option<&Path>) -> Self {
        match temp_dir {
            Some(dir) => Self::new(dir),
            None => {
                let parent = output_video.parent().unwrap_or_else(|| Path::new(""));
                Self::new(parent.join(DEFAULT_TEMP_DIR_NAME))
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn create(&self) -> SlidecastResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create workspace '{}'", self.dir.display()))?;
        Ok(())
    }

    pub fn default_audio_path(&self) -> PathBuf {
        self.dir.join(DEFAULT_AUDIO_FILE_NAME)
    }

    /// Path of the segment for the image at `index` (0-based); file names are 1-based and
    /// zero-padded so they sort in render order.
    pub fn segment_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("segment_{:03}.mp4", index + 1))
    }

    pub fn merged_path(&self) -> PathBuf {
        self.dir.join(MERGED_FILE_NAME)
    }

    /// Every file a run over `image_count` images may create and later delete.
    pub fn intermediate_paths(&self, image_count: usize) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = (0..image_count).map(|i| self.segment_path(i)).collect();
        paths.push(self.merged_path());
        paths.push(self.default_audio_path());
        paths
    }

    /// Remove the workspace if nothing is left in it. Returns whether it was removed.
    pub fn remove_if_empty(&self) -> bool {
        match std::fs::remove_dir(&self.dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(dir = %self.dir.display(), error = %e, "workspace left in place");
                false
            }
        }
    }
}

/// `true` when `a` and `b` name the same location once made absolute. Symlinks are not
/// resolved, so the paths need not exist yet.
pub(crate) fn same_location(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Who is responsible for deleting an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// Created by the pipeline in its workspace; deleted after a successful run.
    Pipeline,
    /// Supplied by or destined for the caller; never deleted.
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioOrigin {
    Reused,
    Synthesized,
}

/// The narration audio a run muxed into its output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub ownership: Ownership,
    pub origin: AudioOrigin,
    pub duration_sec: f64,
}

/// Where the narration audio comes from, decided before anything is synthesized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AudioPlan {
    pub(crate) path: PathBuf,
    pub(crate) ownership: Ownership,
    pub(crate) reuse: bool,
}

impl AudioPlan {
    /// An explicit path is always caller-owned, whether it already exists or is about to be
    /// written. The default workspace path is pipeline-owned, and reused when a previous run
    /// left it behind.
    pub(crate) fn resolve(explicit: Option<&Path>, workspace: &Workspace) -> Self {
        match explicit {
            Some(path) => Self {
                path: path.to_path_buf(),
                ownership: Ownership::External,
                reuse: path.is_file(),
            },
            None => {
                let path = workspace.default_audio_path();
                Self {
                    reuse: path.is_file(),
                    path,
                    ownership: Ownership::Pipeline,
                }
            }
        }
    }
}
