//! Audio output port.
//!
//! An [`AudioOutput`] turns an artifact into a running [`PlaybackHandle`].
//! Completion is reported through a one-shot callback rather than polling,
//! so the controller can advance exactly once per segment.

use std::time::Duration;

use thiserror::Error;

use super::AudioArtifact;

/// How a playback handle came to an end on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEnd {
    Finished,
    Failed(String),
}

/// Invoked once when a handle finishes or fails. Never invoked after
/// [`PlaybackHandle::stop`].
pub type FinishCallback = Box<dyn FnOnce(PlaybackEnd) + Send + 'static>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AudioOutputError {
    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("audio device error: {0}")]
    Device(String),
}

/// A single playing (or paused) segment.
///
/// There is no `resume`: a paused segment is continued with a new handle
/// seeked to [`position`](Self::position).
pub trait PlaybackHandle: Send + Sync {
    fn pause(&self);

    /// Halt playback for good. The finish callback must not fire afterwards.
    fn stop(&self);

    /// Offset into the segment.
    fn position(&self) -> Duration;
}

/// Creates playback handles from synthesized audio.
pub trait AudioOutput: Send + Sync {
    /// Start playing `artifact`, seeking to `seek` first when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be decoded or the device is gone.
    fn play(
        &self,
        artifact: &AudioArtifact,
        seek: Option<Duration>,
        on_end: FinishCallback,
    ) -> Result<Box<dyn PlaybackHandle>, AudioOutputError>;
}
