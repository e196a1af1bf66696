//! Core domain types and port definitions for narrator.
//!
//! This crate holds everything that is independent of the network and of the
//! audio device: text extraction, paragraph splitting, segment identity and
//! cache keys, settings, and the port traits implemented by the adapter crates.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod settings;
pub mod store;

// Re-export commonly used types for convenience
pub use domain::{
    ButtonState, CacheKey, ChatContext, ExtractMode, ExtractionConfig, ExtractionResult,
    Fallback, MessageId, Notice, PersonaKey, PlaybackParams, ResultMode, Segment, SpeechQueue,
    build_queue, extract, split_paragraphs,
};
pub use paths::{DATA_DIR_ENV, PathError, data_root, ensure_data_root, settings_path};
pub use ports::{
    AudioArtifact, AudioOutput, AudioOutputError, FinishCallback, NoopReporter, PlaybackEnd,
    PlaybackHandle, ReporterEvent, SpeechSynthesizer, StateReporter, SynthesisError, VoiceParams,
};
pub use settings::{
    CustomVoice, ExtractSettingsPatch, PersonaExtractSettings, Settings, SettingsError,
    validate_settings,
};
pub use store::{SettingsStore, StoreError, StoredConfig};

// Silence unused dev-dependency warnings for crates only used by integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use tokio_test as _;
