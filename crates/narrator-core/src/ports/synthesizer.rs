//! Speech synthesis port.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Voice settings sent with every synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceParams {
    pub voice: String,
    pub speed: f32,
    pub gain: f32,
    pub response_format: String,
}

impl VoiceParams {
    pub const DEFAULT_FORMAT: &'static str = "mp3";

    #[must_use]
    pub fn new(voice: impl Into<String>, speed: f32, gain: f32) -> Self {
        Self {
            voice: voice.into(),
            speed,
            gain,
            response_format: Self::DEFAULT_FORMAT.to_string(),
        }
    }

    #[must_use]
    pub fn with_response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = format.into();
        self
    }
}

/// Synthesized audio for one segment.
///
/// The payload is shared, so cloning an artifact out of the segment cache
/// never copies the audio bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    data: Arc<[u8]>,
    format: String,
}

impl AudioArtifact {
    #[must_use]
    pub fn new(data: impl Into<Arc<[u8]>>, format: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            format: format.into(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Container format reported by the backend (`mp3`, `wav`, ...).
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A seekable reader over the payload, suitable for a decoder.
    #[must_use]
    pub fn cursor(&self) -> Cursor<Arc<[u8]>> {
        Cursor::new(Arc::clone(&self.data))
    }
}

/// Failure to produce audio for one segment.
///
/// `Clone` because one in-flight outcome is handed to every waiter of the
/// segment cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    /// Missing API key, voice or text. Terminal for the requested action.
    #[error("configuration error: {0}")]
    Config(String),

    /// The backend answered with a non-success status.
    #[error("TTS backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("TTS request failed: {0}")]
    Transport(String),
}

impl SynthesisError {
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Turns one paragraph of text into audio.
///
/// Implementations make exactly one attempt per call; the controller decides
/// what to do on failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> Result<AudioArtifact, SynthesisError>;
}
