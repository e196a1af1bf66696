//! HTTP client for the TTS provider.

mod speech;
mod voices;

use reqwest::Response;
use url::Url;

use crate::config::TtsClientConfig;
use crate::error::{ProviderError, ProviderResult};

pub use speech::qualify_voice;
pub use voices::{VoiceUpload, parse_voice_list, preset_voices, validate_voice_name};

/// Client for the provider's speech and voice endpoints.
///
/// Every request carries the API key as a bearer token. Requests that need
/// a key fail with [`ProviderError::MissingApiKey`] before touching the
/// network.
#[derive(Debug, Clone)]
pub struct TtsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl TtsClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Fails if the API URL does not parse or the HTTP client cannot be built.
    pub fn new(config: &TtsClientConfig) -> ProviderResult<Self> {
        let base = Url::parse(config.api_url.trim())?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn api_key(&self) -> ProviderResult<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)
    }
}

/// Pass successful responses through; turn anything else into
/// [`ProviderError::ApiRequestFailed`] carrying the response body.
pub(crate) async fn ensure_success(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::ApiRequestFailed {
        status: status.as_u16(),
        body,
    })
}
