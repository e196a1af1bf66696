//! `POST /audio/speech`.

use async_trait::async_trait;
use narrator_core::{AudioArtifact, SpeechSynthesizer, SynthesisError, VoiceParams};
use serde::Serialize;
use tracing::debug;

use super::{TtsClient, ensure_success};
use crate::error::{ProviderError, ProviderResult};

/// Prefix reserved for cloned voices; these are sent as-is.
const CUSTOM_VOICE_PREFIX: &str = "speech:";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: String,
    response_format: &'a str,
    speed: f32,
    gain: f32,
}

/// Voice id as the provider expects it: preset names are scoped by model,
/// cloned voice uris pass through.
#[must_use]
pub fn qualify_voice(model: &str, voice: &str) -> String {
    let voice = voice.trim();
    if voice.starts_with(CUSTOM_VOICE_PREFIX) {
        voice.to_string()
    } else {
        format!("{model}:{voice}")
    }
}

impl TtsClient {
    /// Synthesize `text` and return the raw audio bytes.
    ///
    /// # Errors
    ///
    /// Missing key, voice or text fail before any request is made. A non-2xx
    /// response yields [`ProviderError::ApiRequestFailed`].
    pub async fn synthesize_speech(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> ProviderResult<Vec<u8>> {
        let key = self.api_key()?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyText);
        }
        if params.voice.trim().is_empty() {
            return Err(ProviderError::MissingVoice);
        }

        let body = SpeechRequest {
            model: self.model(),
            input: text,
            voice: qualify_voice(self.model(), &params.voice),
            response_format: &params.response_format,
            speed: params.speed,
            gain: params.gain,
        };
        debug!(
            voice = %body.voice,
            chars = text.chars().count(),
            format = body.response_format,
            "Requesting speech"
        );

        let response = self
            .http
            .post(self.endpoint("/audio/speech"))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        let bytes = ensure_success(response).await?.bytes().await?;

        debug!(bytes = bytes.len(), "Speech received");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsClient {
    async fn synthesize(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> Result<AudioArtifact, SynthesisError> {
        let bytes = self.synthesize_speech(text, params).await?;
        Ok(AudioArtifact::new(bytes, params.response_format.clone()))
    }
}
