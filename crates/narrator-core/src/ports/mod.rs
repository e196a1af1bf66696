//! Port definitions (trait abstractions) for the collaborators around the
//! playback controller.
//!
//! Ports contain no network or audio code and use only domain types.
//! Adapters live in `narrator-provider` (speech synthesis) and
//! `narrator-playback` (audio output).

mod audio;
mod reporter;
mod synthesizer;

pub use audio::{AudioOutput, AudioOutputError, FinishCallback, PlaybackEnd, PlaybackHandle};
pub use reporter::{NoopReporter, ReporterEvent, StateReporter};
pub use synthesizer::{AudioArtifact, SpeechSynthesizer, SynthesisError, VoiceParams};
