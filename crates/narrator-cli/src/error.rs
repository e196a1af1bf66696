//! CLI error type and exit codes.

use narrator_core::{SettingsError, StoreError};
use narrator_playback::PlaybackError;
use narrator_provider::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Bad command-line input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("IO error: {0}")]
    Io(String),

    /// Missing or unusable configuration (API key, settings file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The TTS backend, GitHub or the host application failed.
    #[error("Service error: {0}")]
    Service(String),

    #[error("Audio error: {0}")]
    Audio(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow sysexits.h where one fits:
    /// - 2: invalid arguments
    /// - 69: service unavailable
    /// - 71: audio device (OS) error
    /// - 74: I/O error
    /// - 78: configuration error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,
            Self::Service(_) => 69, // EX_UNAVAILABLE
            Self::Audio(_) => 71,   // EX_OSERR
            Self::Io(_) => 74,      // EX_IOERR
            Self::Config(_) => 78,  // EX_CONFIG
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { .. } => Self::Io(err.to_string()),
            StoreError::Invalid(e) => e.into(),
            StoreError::Json(_) | StoreError::Path(_) => Self::Config(err.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingApiKey
            | ProviderError::MissingVoice
            | ProviderError::InvalidUrl(_)
            | ProviderError::NoRepository => Self::Config(err.to_string()),
            ProviderError::EmptyText | ProviderError::InvalidVoiceName(_) => {
                Self::Arguments(err.to_string())
            }
            ProviderError::ApiRequestFailed { .. }
            | ProviderError::Network(_)
            | ProviderError::Json(_)
            | ProviderError::NoCommit => Self::Service(err.to_string()),
        }
    }
}

impl From<PlaybackError> for CliError {
    fn from(err: PlaybackError) -> Self {
        Self::Audio(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for an error returned from a handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_map_to_categories() {
        assert_eq!(CliError::from(ProviderError::MissingApiKey).exit_code(), 78);
        assert_eq!(
            CliError::from(ProviderError::ApiRequestFailed {
                status: 500,
                body: String::new()
            })
            .exit_code(),
            69
        );
        assert_eq!(
            CliError::from(ProviderError::InvalidVoiceName("a b".into())).exit_code(),
            2
        );
    }

    #[test]
    fn test_invalid_settings_are_argument_errors() {
        let err = CliError::from(StoreError::Invalid(SettingsError::EmptyApiUrl));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_for_foreign_error() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(exit_code_for(&err), 1);

        let err = anyhow::Error::from(CliError::Audio("no device".into()));
        assert_eq!(exit_code_for(&err), 71);
    }
}
