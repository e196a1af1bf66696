//! Remote adapters for narrator.
//!
//! - [`TtsClient`]: speech synthesis and voice management against a
//!   SiliconFlow-compatible HTTP API. Implements the core
//!   [`SpeechSynthesizer`](narrator_core::SpeechSynthesizer) port.
//! - [`UpdateChecker`]: compares the latest GitHub commit touching the
//!   extension against the installed baseline and triggers the host's
//!   extension update endpoint.

#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod updater;

pub use client::{
    TtsClient, VoiceUpload, parse_voice_list, preset_voices, qualify_voice, validate_voice_name,
};
pub use config::TtsClientConfig;
pub use error::{ProviderError, ProviderResult};
pub use updater::{
    CommitSource, DEFAULT_EXTENSION_NAME, ExtensionInstaller, GitHubCommits, HostInstaller,
    RepoRef, UpdateChecker, UpdateOutcome, normalize_repo, short_sha, should_auto_check,
};

// Silence unused dev-dependency warnings for crates only used by integration tests
#[cfg(test)]
use httpmock as _;
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use tokio_test as _;
