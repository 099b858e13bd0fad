use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{
    stage::{Progress, Stage},
    workspace::{AudioArtifact, AudioOrigin, AudioPlan, Ownership, Workspace, same_location},
};
use crate::{
    foundation::{
        error::{SlidecastError, SlidecastResult},
        interrupt::check_interrupt,
        process::ensure_parent_dir,
    },
    media::MediaTools,
    tts::{SpeechConfig, SpeechSynthesizer},
};

/// Everything one narrated-video run needs.
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    /// UTF-8 narration script.
    pub input_txt: PathBuf,
    /// Images in display order.
    pub images: Vec<PathBuf>,
    pub output_video: PathBuf,
    pub speech: SpeechConfig,
    /// Workspace directory; defaults to `temp/` beside the output video.
    pub temp_dir: Option<PathBuf>,
    /// Narration audio to reuse if it exists, or to synthesize into if it does not.
    pub audio_file: Option<PathBuf>,
    /// Keep the default workspace audio instead of deleting it after the run.
    pub keep_audio: bool,
}

impl GenerateRequest {
    pub fn new(
        input_txt: impl Into<PathBuf>,
        images: Vec<PathBuf>,
        output_video: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_txt: input_txt.into(),
            images,
            output_video: output_video.into(),
            speech: SpeechConfig::default(),
            temp_dir: None,
            audio_file: None,
            keep_audio: false,
        }
    }

    pub fn validate(&self) -> SlidecastResult<()> {
        if !self.input_txt.is_file() {
            return Err(SlidecastError::validation(format!(
                "narration text file '{}' does not exist",
                self.input_txt.display()
            )));
        }
        if self.images.is_empty() {
            return Err(SlidecastError::validation("at least one image is required"));
        }
        if let Some(missing) = self.images.iter().find(|p| !p.is_file()) {
            return Err(SlidecastError::validation(format!(
                "image file '{}' does not exist",
                missing.display()
            )));
        }
        self.speech.validate()?;
        self.check_collisions()
    }

    /// The output and an explicit audio file must not share a path with each other or with an
    /// intermediate the run will overwrite or delete.
    fn check_collisions(&self) -> SlidecastResult<()> {
        let workspace = Workspace::for_output(&self.output_video, self.temp_dir.as_deref());
        let intermediates = workspace.intermediate_paths(self.images.len());
        let collides = |path: &Path| intermediates.iter().find(|p| same_location(p, path));

        if let Some(hit) = collides(&self.output_video) {
            return Err(SlidecastError::validation(format!(
                "output video '{}' would be overwritten by the intermediate '{}'",
                self.output_video.display(),
                hit.display()
            )));
        }
        if let Some(audio) = &self.audio_file {
            if same_location(audio, &self.output_video) {
                return Err(SlidecastError::validation(format!(
                    "audio file '{}' is also the output video",
                    audio.display()
                )));
            }
            // The default audio path is fine: an explicit path is never deleted.
            if let Some(hit) = collides(audio).filter(|p| **p != workspace.default_audio_path()) {
                return Err(SlidecastError::validation(format!(
                    "audio file '{}' would be overwritten by the intermediate '{}'",
                    audio.display(),
                    hit.display()
                )));
            }
        }
        Ok(())
    }
}

/// Summary of a successful run.
#[derive(Clone, Debug, Serialize)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub audio: AudioArtifact,
    pub per_image_duration_sec: f64,
    pub segment_count: usize,
    /// `true` when segments were concatenated, `false` when a single segment was muxed directly.
    pub merged: bool,
    /// Pipeline-owned audio left on disk because the caller asked to keep it.
    pub kept_audio: Option<PathBuf>,
    pub workspace: PathBuf,
    pub workspace_removed: bool,
    pub stages: Vec<Stage>,
}

/// Equal share of the narration per image.
pub fn per_image_duration(audio_duration_sec: f64, image_count: usize) -> SlidecastResult<f64> {
    if image_count == 0 {
        return Err(SlidecastError::validation("no images to render"));
    }
    let per_image = audio_duration_sec / image_count as f64;
    if !per_image.is_finite() || per_image <= 0.0 {
        return Err(SlidecastError::empty_input(format!(
            "narration audio lasts {audio_duration_sec:.3}s, too short to split across {image_count} image(s)"
        )));
    }
    Ok(per_image)
}

enum MergedVideo<'a> {
    /// One image: its segment stands in for the merged video.
    Single(&'a Path),
    Concatenated(PathBuf),
}

impl MergedVideo<'_> {
    fn path(&self) -> &Path {
        match self {
            MergedVideo::Single(p) => *p,
            MergedVideo::Concatenated(p) => p.as_path(),
        }
    }
}

/// Sequences synthesis, probing, segment rendering, concatenation and muxing.
///
/// Every stage blocks and fails fast. Nothing is cleaned up after a failure so intermediates can
/// be inspected; only a fully muxed run deletes its pipeline-owned files.
pub struct Pipeline<'a> {
    speech: &'a dyn SpeechSynthesizer,
    media: &'a dyn MediaTools,
}

impl<'a> Pipeline<'a> {
    pub fn new(speech: &'a dyn SpeechSynthesizer, media: &'a dyn MediaTools) -> Self {
        Self { speech, media }
    }

    #[tracing::instrument(
        skip_all,
        fields(images = req.images.len(), output = %req.output_video.display())
    )]
    pub fn generate(&self, req: &GenerateRequest) -> SlidecastResult<GenerateReport> {
        req.validate()?;
        let mut progress = Progress::new();
        ensure_parent_dir(&req.output_video)?;

        let text = load_narration(&req.input_txt)?;
        progress.enter(Stage::TextLoaded);

        let workspace = Workspace::for_output(&req.output_video, req.temp_dir.as_deref());
        workspace.create()?;

        let audio = self.prepare_audio(&text, req, &workspace)?;
        progress.enter(Stage::AudioReady);

        let per_image = per_image_duration(audio.duration_sec, req.images.len())?;
        tracing::info!(
            audio_sec = audio.duration_sec,
            per_image_sec = per_image,
            "rendering {} segment(s)",
            req.images.len()
        );
        let segments = self.render_segments(&req.images, per_image, &workspace)?;
        progress.enter(Stage::SegmentsRendered);

        let merged = self.merge_segments(&segments, &workspace)?;
        progress.enter(Stage::Merged);

        check_interrupt("muxing")?;
        self.media.mux(merged.path(), &audio.path, &req.output_video)?;
        tracing::info!(output = %req.output_video.display(), "narrated video written");
        progress.enter(Stage::Muxed);

        let kept_audio = clean_up(&segments, &merged, &audio, req.keep_audio);
        progress.enter(Stage::CleanedUp);

        let workspace_removed = workspace.remove_if_empty();
        progress.enter(Stage::Done);

        Ok(GenerateReport {
            output: req.output_video.clone(),
            per_image_duration_sec: per_image,
            segment_count: segments.len(),
            merged: matches!(merged, MergedVideo::Concatenated(_)),
            kept_audio,
            workspace: workspace.dir().to_path_buf(),
            workspace_removed,
            stages: progress.into_history(),
            audio,
        })
    }

    fn prepare_audio(
        &self,
        text: &str,
        req: &GenerateRequest,
        workspace: &Workspace,
    ) -> SlidecastResult<AudioArtifact> {
        let plan = AudioPlan::resolve(req.audio_file.as_deref(), workspace);

        let origin = if plan.reuse {
            tracing::info!(path = %plan.path.display(), "reusing existing narration audio");
            AudioOrigin::Reused
        } else {
            check_interrupt("speech synthesis")?;
            ensure_parent_dir(&plan.path)?;
            tracing::info!(
                path = %plan.path.display(),
                voice = %req.speech.voice,
                "synthesizing narration"
            );
            self.speech.synthesize(text, &req.speech, &plan.path)?;
            AudioOrigin::Synthesized
        };

        let duration_sec = self.media.probe_duration(&plan.path)?;
        Ok(AudioArtifact {
            path: plan.path,
            ownership: plan.ownership,
            origin,
            duration_sec,
        })
    }

    fn render_segments(
        &self,
        images: &[PathBuf],
        per_image_sec: f64,
        workspace: &Workspace,
    ) -> SlidecastResult<Vec<PathBuf>> {
        let total = images.len();
        let mut segments = Vec::with_capacity(total);
        for (idx, image) in images.iter().enumerate() {
            check_interrupt("rendering segments")?;
            let out = workspace.segment_path(idx);
            tracing::info!(image = %image.display(), "rendering segment {}/{total}", idx + 1);
            self.media.render_segment(image, per_image_sec, &out)?;
            segments.push(out);
        }
        Ok(segments)
    }

    fn merge_segments<'s>(
        &self,
        segments: &'s [PathBuf],
        workspace: &Workspace,
    ) -> SlidecastResult<MergedVideo<'s>> {
        match segments {
            [] => Err(SlidecastError::validation("no segments to merge")),
            [only] => Ok(MergedVideo::Single(only)),
            _ => {
                check_interrupt("concatenation")?;
                let out = workspace.merged_path();
                tracing::info!(segments = segments.len(), "concatenating segments");
                self.media.concat(segments, &out)?;
                Ok(MergedVideo::Concatenated(out))
            }
        }
    }
}

fn load_narration(path: &Path) -> SlidecastResult<String> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SlidecastError::validation(format!(
            "failed to read narration text '{}': {e}",
            path.display()
        ))
    })?;
    let text = raw.trim();
    if text.is_empty() {
        return Err(SlidecastError::empty_input(format!(
            "narration text file '{}' is empty",
            path.display()
        )));
    }
    Ok(text.to_string())
}

/// Delete pipeline-owned intermediates. Returns the audio path when it was kept on request.
fn clean_up(
    segments: &[PathBuf],
    merged: &MergedVideo<'_>,
    audio: &AudioArtifact,
    keep_audio: bool,
) -> Option<PathBuf> {
    for segment in segments {
        remove_intermediate(segment);
    }
    if let MergedVideo::Concatenated(path) = merged {
        remove_intermediate(path);
    }

    match audio.ownership {
        Ownership::External => None,
        Ownership::Pipeline if keep_audio => {
            tracing::info!(path = %audio.path.display(), "keeping narration audio");
            Some(audio.path.clone())
        }
        Ownership::Pipeline => {
            remove_intermediate(&audio.path);
            None
        }
    }
}

fn remove_intermediate(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to remove intermediate file"
            );
        }
    }
}
