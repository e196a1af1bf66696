//! Error types for the playback crate.

use narrator_core::AudioOutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Failed to open the default output device.
    #[error("Failed to open audio output: {0}")]
    Output(String),

    /// The audio payload could not be decoded.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// The audio thread exited unexpectedly.
    #[error("Audio thread died")]
    AudioThreadDied,
}

impl From<PlaybackError> for AudioOutputError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Decode(msg) => Self::Decode(msg),
            PlaybackError::Output(msg) => Self::Device(msg),
            PlaybackError::AudioThreadDied => Self::Device("audio thread died".to_string()),
        }
    }
}
