//! Error types for provider operations.
//!
//! Synthesis failures are mapped onto the core [`SynthesisError`] at the
//! port boundary.

use narrator_core::SynthesisError;
use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("No voice selected")]
    MissingVoice,

    #[error("Text is empty")]
    EmptyText,

    /// The server answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    ApiRequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Invalid voice name '{0}': use at most 64 letters, digits, underscores or hyphens"
    )]
    InvalidVoiceName(String),

    #[error("No GitHub repository configured")]
    NoRepository,

    #[error("GitHub returned no commit for the configured branch/path")]
    NoCommit,
}

impl From<ProviderError> for SynthesisError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ApiRequestFailed { status, body } => Self::Backend { status, body },
            ProviderError::MissingApiKey
            | ProviderError::MissingVoice
            | ProviderError::EmptyText
            | ProviderError::InvalidUrl(_)
            | ProviderError::InvalidVoiceName(_)
            | ProviderError::NoRepository => Self::Config(err.to_string()),
            ProviderError::Network(_) | ProviderError::Json(_) | ProviderError::NoCommit => {
                Self::Transport(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_message() {
        let error = ProviderError::ApiRequestFailed {
            status: 401,
            body: "invalid token".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid token"));
    }

    #[test]
    fn test_mapping_to_synthesis_error() {
        assert!(SynthesisError::from(ProviderError::MissingApiKey).is_config());
        assert!(SynthesisError::from(ProviderError::EmptyText).is_config());
        assert_eq!(
            SynthesisError::from(ProviderError::ApiRequestFailed {
                status: 500,
                body: "boom".into()
            }),
            SynthesisError::Backend {
                status: 500,
                body: "boom".into()
            }
        );
    }
}
