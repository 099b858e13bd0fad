//! Slidecast turns a narration script and a list of images into a narrated MP4.
//!
//! The narration is synthesized through an OpenAI-compatible speech endpoint, each image becomes
//! an equal share of the narration's duration, and the system `ffmpeg` joins the clips and muxes
//! the audio in. See [`Pipeline::generate`].
#![forbid(unsafe_code)]

mod foundation;

pub mod media;
pub mod pipeline;
pub mod tts;

pub use crate::foundation::error::{SlidecastError, SlidecastResult};
pub use crate::foundation::interrupt::{interrupt_requested, request_interrupt};
pub use crate::foundation::process::{ensure_parent_dir, is_tool_available};

pub use crate::media::{FfmpegTools, MediaTools};
pub use crate::pipeline::{
    AudioArtifact, AudioOrigin, GenerateReport, GenerateRequest, Ownership, Pipeline, Stage,
    Workspace, merge_videos, per_image_duration,
};
pub use crate::tts::{Credentials, OpenAiSpeech, SpeechConfig, SpeechSynthesizer, Voice};
