//! Public configuration for the TTS client.

use std::time::Duration;

use narrator_core::Settings;
use narrator_core::settings::{DEFAULT_API_URL, DEFAULT_TTS_MODEL};

/// Configuration for [`TtsClient`](crate::TtsClient).
///
/// # Example
///
/// ```
/// use narrator_provider::TtsClientConfig;
/// use std::time::Duration;
///
/// let config = TtsClientConfig::new()
///     .with_api_key("sk-test")
///     .with_timeout(Duration::from_secs(90));
/// ```
#[derive(Debug, Clone)]
pub struct TtsClientConfig {
    pub(crate) api_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) model: String,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
}

impl Default for TtsClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_TTS_MODEL.to_string(),
            user_agent: concat!("narrator/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl TtsClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored settings. A blank API key counts as missing.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let key = settings.api_key.trim();
        Self::new()
            .with_api_url(settings.api_url.trim())
            .with_model(settings.tts_model.trim())
            .with_optional_api_key((!key.is_empty()).then(|| key.to_string()))
    }

    /// Defaults to `https://api.siliconflow.cn/v1`.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Defaults to 60 seconds; long paragraphs take a while to synthesize.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
