//! Voice list, voice cloning and deletion.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use narrator_core::CustomVoice;
use narrator_core::settings::PRESET_VOICES;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{TtsClient, ensure_success};
use crate::error::{ProviderError, ProviderResult};

const MAX_VOICE_NAME_LEN: usize = 64;
const UNNAMED: &str = "unnamed";

/// A reference recording to clone a voice from.
#[derive(Debug, Clone)]
pub struct VoiceUpload {
    pub name: String,
    /// Transcript of the recording.
    pub text: String,
    pub audio: Vec<u8>,
    pub mime: String,
    pub file_name: String,
}

/// Preset voices of the default model.
#[must_use]
pub fn preset_voices() -> Vec<CustomVoice> {
    PRESET_VOICES
        .iter()
        .map(|(id, name)| CustomVoice {
            name: (*name).to_string(),
            uri: (*id).to_string(),
        })
        .collect()
}

/// Voice names are limited to `[a-zA-Z0-9_-]`, at most 64 characters.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidVoiceName`] for anything else.
pub fn validate_voice_name(name: &str) -> ProviderResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_VOICE_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ProviderError::InvalidVoiceName(name.to_string()))
    }
}

/// Read the voice list response. Accepts either a `result` or a `results`
/// array; entries without any uri are skipped.
#[must_use]
pub fn parse_voice_list(value: &Value) -> Vec<CustomVoice> {
    let Some(list) = value
        .get("result")
        .or_else(|| value.get("results"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|voice| {
            let uri = first_str(voice, &["uri", "id", "voice_id"])?;
            let name = first_str(voice, &["name", "customName", "custom_name"]).unwrap_or(UNNAMED);
            Some(CustomVoice {
                name: name.to_string(),
                uri: uri.to_string(),
            })
        })
        .collect()
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}

impl TtsClient {
    /// List the cloned voices registered under this API key.
    pub async fn list_custom_voices(&self) -> ProviderResult<Vec<CustomVoice>> {
        let key = self.api_key()?;
        let response = self
            .http
            .get(self.endpoint("/audio/voice/list"))
            .bearer_auth(key)
            .send()
            .await?;
        let value: Value = ensure_success(response).await?.json().await?;
        let voices = parse_voice_list(&value);
        debug!(count = voices.len(), "Listed custom voices");
        Ok(voices)
    }

    /// Clone a voice from a reference recording.
    ///
    /// Sends JSON with a base64 data URL first; if the provider rejects that,
    /// retries once as multipart form data.
    pub async fn upload_voice(&self, upload: &VoiceUpload) -> ProviderResult<()> {
        let key = self.api_key()?;
        validate_voice_name(&upload.name)?;
        if upload.text.trim().is_empty() {
            return Err(ProviderError::EmptyText);
        }

        let url = self.endpoint("/uploads/audio/voice");
        let data_url = format!("data:{};base64,{}", upload.mime, STANDARD.encode(&upload.audio));
        let body = json!({
            "model": self.model(),
            "customName": upload.name,
            "text": upload.text,
            "audio": data_url,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        if response.status().is_success() {
            debug!(name = %upload.name, "Voice uploaded");
            return Ok(());
        }
        warn!(
            status = response.status().as_u16(),
            "JSON voice upload rejected, retrying as multipart"
        );

        let audio = Part::bytes(upload.audio.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)?;
        let form = Form::new()
            .text("model", self.model().to_string())
            .text("customName", upload.name.clone())
            .text("text", upload.text.clone())
            .part("audio", audio);

        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .multipart(form)
            .send()
            .await?;
        ensure_success(response).await?;
        debug!(name = %upload.name, "Voice uploaded (multipart)");
        Ok(())
    }

    /// Delete a cloned voice by uri.
    pub async fn delete_voice(&self, uri: &str) -> ProviderResult<()> {
        let key = self.api_key()?;
        let response = self
            .http
            .post(self.endpoint("/audio/voice/deletions"))
            .bearer_auth(key)
            .json(&json!({ "uri": uri }))
            .send()
            .await?;
        ensure_success(response).await?;
        debug!(uri, "Voice deleted");
        Ok(())
    }

    /// Check the key and URL by fetching the voice list.
    pub async fn test_connection(&self) -> ProviderResult<()> {
        let key = self.api_key()?;
        let response = self
            .http
            .get(self.endpoint("/audio/voice/list"))
            .bearer_auth(key)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
