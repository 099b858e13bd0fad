//! Text-to-speech: narration text in, audio file out.
//!
//! [`SpeechSynthesizer`] is the seam the pipeline talks to. [`OpenAiSpeech`] is the production
//! implementation against an OpenAI-compatible `/audio/speech` endpoint.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// HTTP client for OpenAI-compatible speech endpoints.
pub mod openai;

pub use openai::{Credentials, OpenAiSpeech};

pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;
pub const DEFAULT_MODEL: &str = "tts-1";

/// Voices offered by the speech endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = SlidecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| {
                SlidecastError::validation(format!(
                    "unknown voice '{s}' (expected one of: alloy, echo, fable, onyx, nova, shimmer)"
                ))
            })
    }
}

/// Per-request synthesis settings. Immutable; passed into every [`SpeechSynthesizer`] call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub voice: Voice,
    /// Playback speed multiplier in `0.25..=4.0`.
    pub speed: f32,
    pub model: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: Voice::default(),
            speed: 1.0,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl SpeechConfig {
    pub fn validate(&self) -> SlidecastResult<()> {
        if !self.speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(SlidecastError::validation(format!(
                "speech speed must be within {MIN_SPEED}..={MAX_SPEED}, got {}",
                self.speed
            )));
        }
        if self.model.trim().is_empty() {
            return Err(SlidecastError::validation("speech model must be non-empty"));
        }
        Ok(())
    }
}

/// Encoded audio container requested from the endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    /// Pick the format matching the destination's extension, falling back to MP3.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("opus") => Self::Opus,
            Some("aac") => Self::Aac,
            Some("flac") => Self::Flac,
            Some("wav") => Self::Wav,
            Some("pcm") => Self::Pcm,
            _ => Self::Mp3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }
}

/// Turns narration text into an audio file on disk.
///
/// Implementations write exactly one file at `out_path` on success and never retry.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str, cfg: &SpeechConfig, out_path: &Path) -> SlidecastResult<()>;
}
