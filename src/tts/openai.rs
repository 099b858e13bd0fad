use std::{fmt, path::Path, time::Duration};

use anyhow::Context as _;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::{AudioFormat, SpeechConfig, SpeechSynthesizer, Voice};
use crate::foundation::{
    error::{SlidecastError, SlidecastResult},
    process::ensure_parent_dir,
};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// API key and endpoint, resolved once when the client is built.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    base_url: String,
}

impl Credentials {
    /// Resolve credentials from explicit values, falling back to `OPENAI_API_KEY` and
    /// `OPENAI_BASE_URL`.
    pub fn resolve(api_key: Option<String>, base_url: Option<String>) -> SlidecastResult<Self> {
        Self::resolve_with(api_key, base_url, |key| std::env::var(key).ok())
    }

    pub(crate) fn resolve_with(
        api_key: Option<String>,
        base_url: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> SlidecastResult<Self> {
        let api_key = api_key
            .or_else(|| env(API_KEY_ENV))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                SlidecastError::configuration(format!(
                    "no API key configured; set {API_KEY_ENV}"
                ))
            })?;

        let base_url = base_url
            .or_else(|| env(BASE_URL_ENV))
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: Voice,
    input: &'a str,
    speed: f32,
    response_format: &'static str,
}

/// Blocking client for `POST {base_url}/audio/speech`.
#[derive(Debug)]
pub struct OpenAiSpeech {
    credentials: Credentials,
    http: reqwest::blocking::Client,
}

impl OpenAiSpeech {
    pub fn new(credentials: Credentials) -> SlidecastResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                SlidecastError::configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { credentials, http })
    }

    /// Build a client from the environment. Fails when no API key is set.
    pub fn from_env() -> SlidecastResult<Self> {
        Self::new(Credentials::resolve(None, None)?)
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/speech", self.credentials.base_url)
    }
}

impl SpeechSynthesizer for OpenAiSpeech {
    #[tracing::instrument(
        skip(self, text, cfg),
        fields(chars = text.chars().count(), voice = %cfg.voice, model = %cfg.model)
    )]
    fn synthesize(&self, text: &str, cfg: &SpeechConfig, out_path: &Path) -> SlidecastResult<()> {
        if text.trim().is_empty() {
            return Err(SlidecastError::empty_input("narration text is empty"));
        }
        cfg.validate()?;
        ensure_parent_dir(out_path)?;

        let endpoint = self.endpoint();
        let body = SpeechRequest {
            model: &cfg.model,
            voice: cfg.voice,
            input: text,
            speed: cfg.speed,
            response_format: AudioFormat::for_path(out_path).as_str(),
        };

        let mut resp = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.credentials.api_key)
            .json(&body)
            .send()
            .map_err(|e| SlidecastError::synthesis(format!("request to {endpoint} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            return Err(SlidecastError::synthesis(format!(
                "speech endpoint returned HTTP {status}: {}",
                detail.trim()
            )));
        }

        // Stream into a sibling temp file; the destination appears only once the full body is on
        // disk, so a later run never reuses truncated audio.
        let dir = match out_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut partial = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create a temporary file in '{}'", dir.display()))?;
        let written = resp.copy_to(&mut partial).map_err(|e| {
            SlidecastError::synthesis(format!(
                "failed to stream audio into '{}': {e}",
                out_path.display()
            ))
        })?;

        if written == 0 {
            return Err(SlidecastError::synthesis(
                "speech endpoint returned an empty audio body",
            ));
        }

        partial
            .persist(out_path)
            .map_err(|e| anyhow::Error::new(e.error))
            .with_context(|| format!("failed to write audio file '{}'", out_path.display()))?;

        tracing::info!(bytes = written, path = %out_path.display(), "speech synthesized");
        Ok(())
    }
}
