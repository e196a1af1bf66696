//! Local speaker output via `rodio`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use narrator_core::{
    AudioArtifact, AudioOutput, AudioOutputError, FinishCallback, PlaybackEnd, PlaybackHandle,
};
use rodio::cpal::FromSample;
use rodio::{Decoder, Sample, Sink, Source};
use tracing::{debug, warn};

use crate::audio_thread::AudioThreadHandle;
use crate::error::PlaybackError;

/// [`AudioOutput`] that decodes artifacts with `rodio` and plays them on the
/// default output device.
pub struct RodioOutput {
    audio: AudioThreadHandle,
}

impl RodioOutput {
    /// Open the default output device.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Output`] when no usable device exists.
    pub fn new() -> Result<Self, PlaybackError> {
        Ok(Self {
            audio: AudioThreadHandle::spawn()?,
        })
    }
}

impl std::fmt::Debug for RodioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioOutput").finish_non_exhaustive()
    }
}

impl AudioOutput for RodioOutput {
    fn play(
        &self,
        artifact: &AudioArtifact,
        seek: Option<Duration>,
        on_end: FinishCallback,
    ) -> Result<Box<dyn PlaybackHandle>, AudioOutputError> {
        let source = Decoder::new(artifact.cursor())
            .map_err(|e| PlaybackError::Decode(format!("{} payload: {e}", artifact.format())))?;
        let sink = self.audio.open_sink()?;

        queue_source(&sink, source, seek);

        let handle = RodioHandle {
            sink: Arc::new(sink),
            stopped: Arc::new(AtomicBool::new(false)),
        };
        handle.spawn_watcher(on_end);

        debug!(bytes = artifact.len(), ?seek, "Segment playback started");
        Ok(Box::new(handle))
    }
}

/// Append `source` to an empty sink and start it at `seek`.
///
/// The sink is held paused until the seek lands so the start of the segment
/// is never audible.
fn queue_source<S>(sink: &Sink, source: S, seek: Option<Duration>)
where
    S: Source + Send + 'static,
    S::Item: Sample + Send,
    f32: FromSample<S::Item>,
{
    sink.pause();
    sink.append(source);
    if let Some(offset) = seek.filter(|d| !d.is_zero()) {
        if let Err(e) = sink.try_seek(offset) {
            warn!(?offset, error = %e, "Seek failed, playing from the start");
        }
    }
    sink.play();
}

struct RodioHandle {
    sink: Arc<Sink>,
    /// Set by `stop` or by the watcher, whichever comes first.
    stopped: Arc<AtomicBool>,
}

impl RodioHandle {
    /// Block a helper thread on the sink and report natural completion.
    ///
    /// `sleep_until_end` also returns when the sink is stopped, in which case
    /// `stopped` is already set and the callback is dropped unused.
    fn spawn_watcher(&self, on_end: FinishCallback) {
        let sink = Arc::clone(&self.sink);
        let stopped = Arc::clone(&self.stopped);

        std::thread::spawn(move || {
            sink.sleep_until_end();
            if stopped.swap(true, Ordering::SeqCst) {
                return;
            }
            debug!("Segment finished naturally");
            on_end(PlaybackEnd::Finished);
        });
    }
}

impl PlaybackHandle for RodioHandle {
    fn pause(&self) {
        self.sink.pause();
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.sink.stop();
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }
}
