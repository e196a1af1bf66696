//! Settings domain types and validation.
//!
//! This module contains the persisted configuration: provider credentials,
//! voice parameters, global extraction marks, update-check bookkeeping and
//! persona-scoped extraction overrides. These are pure domain types with no
//! infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ExtractMode, ExtractionConfig, Fallback, PersonaKey, PlaybackParams};
use crate::ports::VoiceParams;

/// Default provider endpoint.
pub const DEFAULT_API_URL: &str = "https://api.siliconflow.cn/v1";

/// Default speech model.
pub const DEFAULT_TTS_MODEL: &str = "FunAudioLLM/CosyVoice2-0.5B";

/// Response formats the provider accepts.
pub const SUPPORTED_FORMATS: &[&str] = &["mp3", "opus", "wav", "pcm"];

/// Preset voices of the default model, as `(id, display name)`.
pub const PRESET_VOICES: &[(&str, &str)] = &[
    ("alex", "Alex (male)"),
    ("anna", "Anna (female)"),
    ("bella", "Bella (female)"),
    ("benjamin", "Benjamin (male)"),
    ("charles", "Charles (male)"),
    ("claire", "Claire (female)"),
    ("david", "David (male)"),
    ("diana", "Diana (female)"),
];

const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;
const GAIN_RANGE: std::ops::RangeInclusive<f32> = -10.0..=10.0;

/// A cloned voice registered with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVoice {
    pub name: String,
    pub uri: String,
}

/// Application settings structure.
///
/// Unknown or missing fields fall back to defaults so older settings files
/// keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub api_key: String,
    pub api_url: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_speed: f32,
    pub tts_gain: f32,
    pub response_format: String,
    pub sample_rate: u32,

    /// Global start mark, used when the persona has none.
    pub text_start: String,
    /// Global end mark, used when the persona has none.
    pub text_end: String,

    /// Start reading new messages as soon as they arrive.
    pub auto_play: bool,

    pub github_repo: Option<String>,
    pub github_branch: String,
    /// Restrict the commit lookup to a sub-directory of the repository.
    pub github_path: Option<String>,
    pub auto_check_updates: bool,
    pub update_check_interval_hours: u32,
    pub last_installed_commit: Option<String>,
    pub last_remote_commit: Option<String>,
    pub last_auto_check_at: Option<DateTime<Utc>>,

    /// Base URL of the host chat application (for the update endpoint).
    pub host_url: String,

    pub custom_voices: Vec<CustomVoice>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            tts_voice: "alex".to_string(),
            tts_speed: 1.0,
            tts_gain: 0.0,
            response_format: VoiceParams::DEFAULT_FORMAT.to_string(),
            sample_rate: 32_000,
            text_start: "（".to_string(),
            text_end: "）".to_string(),
            auto_play: true,
            github_repo: None,
            github_branch: "main".to_string(),
            github_path: None,
            auto_check_updates: false,
            update_check_interval_hours: 12,
            last_installed_commit: None,
            last_remote_commit: None,
            last_auto_check_at: None,
            host_url: "http://127.0.0.1:8000".to_string(),
            custom_voices: Vec::new(),
        }
    }
}

impl Settings {
    /// Voice parameters for a new queue.
    #[must_use]
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams::new(self.tts_voice.clone(), self.tts_speed, self.tts_gain)
            .with_response_format(self.response_format.clone())
    }

    /// Resolve the extraction config for a persona.
    ///
    /// Persona marks win; blank ones fall back to the global `text_start` /
    /// `text_end`.
    #[must_use]
    pub fn effective_extract_config(&self, persona: &PersonaExtractSettings) -> ExtractionConfig {
        let start = non_blank_or(persona.start.as_deref(), &self.text_start);
        let end = non_blank_or(persona.end.as_deref(), &self.text_end);

        ExtractionConfig {
            mode: persona.mode.unwrap_or_default(),
            start,
            end,
            regex: persona.regex.as_deref().map(str::trim).unwrap_or_default().to_string(),
            fallback: persona.fallback.unwrap_or_default(),
            skip_code_blocks: persona.skip_code_blocks.unwrap_or(false),
        }
    }

    /// Snapshot everything a queue build needs.
    #[must_use]
    pub fn playback_params(
        &self,
        persona_key: PersonaKey,
        persona: &PersonaExtractSettings,
    ) -> PlaybackParams {
        PlaybackParams::new(
            self.voice_params(),
            persona_key,
            self.effective_extract_config(persona),
        )
    }

    /// The API key with everything but the last four characters hidden.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let key = self.api_key.trim();
        if key.is_empty() {
            return "(not set)".to_string();
        }
        let chars: Vec<char> = key.chars().collect();
        let visible = chars.len().min(4);
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("{}{tail}", "*".repeat(chars.len() - visible))
    }

    /// Set one field from its camelCase name and a string value.
    ///
    /// Bookkeeping fields (commits, timestamps, custom voices) are not
    /// settable this way. The result is not validated; call
    /// [`validate_settings`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown fields and unparsable values.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };
        let optional = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        match field {
            "apiKey" => value.trim().clone_into(&mut self.api_key),
            "apiUrl" => value.trim().clone_into(&mut self.api_url),
            "ttsModel" => value.trim().clone_into(&mut self.tts_model),
            "ttsVoice" => value.trim().clone_into(&mut self.tts_voice),
            "ttsSpeed" => self.tts_speed = value.trim().parse().map_err(|_| invalid())?,
            "ttsGain" => self.tts_gain = value.trim().parse().map_err(|_| invalid())?,
            "responseFormat" => self.response_format = value.trim().to_lowercase(),
            "sampleRate" => self.sample_rate = value.trim().parse().map_err(|_| invalid())?,
            "textStart" => value.clone_into(&mut self.text_start),
            "textEnd" => value.clone_into(&mut self.text_end),
            "autoPlay" => self.auto_play = parse_bool(value).ok_or_else(invalid)?,
            "githubRepo" => self.github_repo = optional(value),
            "githubBranch" => value.trim().clone_into(&mut self.github_branch),
            "githubPath" => self.github_path = optional(value),
            "autoCheckUpdates" => self.auto_check_updates = parse_bool(value).ok_or_else(invalid)?,
            "updateCheckIntervalHours" => {
                self.update_check_interval_hours = value.trim().parse().map_err(|_| invalid())?;
            }
            "hostUrl" => value.trim().clone_into(&mut self.host_url),
            _ => return Err(SettingsError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    /// Register a custom voice, replacing any entry with the same uri.
    pub fn upsert_custom_voice(&mut self, voice: CustomVoice) {
        self.custom_voices.retain(|v| v.uri != voice.uri);
        self.custom_voices.push(voice);
    }

    /// Forget a custom voice. Returns whether anything was removed.
    pub fn remove_custom_voice(&mut self, uri: &str) -> bool {
        let before = self.custom_voices.len();
        self.custom_voices.retain(|v| v.uri != uri);
        self.custom_voices.len() != before
    }
}

/// Persona-scoped extraction overrides. Every field is optional; missing
/// fields resolve through [`Settings::effective_extract_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonaExtractSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ExtractMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_code_blocks: Option<bool>,
}

/// Partial update of a persona's extraction settings. `Some` fields replace
/// the stored value; `None` fields are left alone.
pub type ExtractSettingsPatch = PersonaExtractSettings;

impl PersonaExtractSettings {
    /// Apply a patch on top of these settings.
    pub fn merge(&mut self, patch: &ExtractSettingsPatch) {
        if patch.mode.is_some() {
            self.mode = patch.mode;
        }
        if let Some(ref start) = patch.start {
            self.start = Some(start.clone());
        }
        if let Some(ref end) = patch.end {
            self.end = Some(end.clone());
        }
        if let Some(ref regex) = patch.regex {
            self.regex = Some(regex.clone());
        }
        if patch.fallback.is_some() {
            self.fallback = patch.fallback;
        }
        if patch.skip_code_blocks.is_some() {
            self.skip_code_blocks = patch.skip_code_blocks;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Speed must be between 0.25 and 4.0, got {0}")]
    InvalidSpeed(f32),

    #[error("Gain must be between -10 and 10, got {0}")]
    InvalidGain(f32),

    #[error("API URL cannot be empty")]
    EmptyApiUrl,

    #[error("Unsupported response format '{0}' (expected one of mp3, opus, wav, pcm)")]
    UnsupportedFormat(String),

    #[error("Update check interval must be at least 1 hour, got {0}")]
    InvalidInterval(u32),

    #[error("Unknown settings field '{0}'")]
    UnknownField(String),

    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },
}

/// Validate settings values.
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if !SPEED_RANGE.contains(&settings.tts_speed) {
        return Err(SettingsError::InvalidSpeed(settings.tts_speed));
    }

    if !GAIN_RANGE.contains(&settings.tts_gain) {
        return Err(SettingsError::InvalidGain(settings.tts_gain));
    }

    if settings.api_url.trim().is_empty() {
        return Err(SettingsError::EmptyApiUrl);
    }

    if !SUPPORTED_FORMATS.contains(&settings.response_format.as_str()) {
        return Err(SettingsError::UnsupportedFormat(
            settings.response_format.clone(),
        ));
    }

    if settings.update_check_interval_hours < 1 {
        return Err(SettingsError::InvalidInterval(
            settings.update_check_interval_hours,
        ));
    }

    Ok(())
}

fn non_blank_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.trim())
        .to_string()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
