//! Playback side of narrator.
//!
//! - [`SegmentCache`]: at most one synthesis per cache key, shared between
//!   concurrent requests, purged on failure.
//! - [`PlaybackController`]: owns the queue of the active message and drives
//!   sequential playback with prefetch, pause/resume and supersession.
//! - [`RodioOutput`]: the local [`AudioOutput`](narrator_core::AudioOutput)
//!   adapter, backed by a dedicated audio thread.

#![deny(unused_crate_dependencies)]

mod audio_thread;
mod cache;
mod controller;
mod error;
mod output;
mod reporter;

pub use cache::SegmentCache;
pub use controller::{PlaybackController, PlayerStatus, PrimaryOutcome, ResumeInfo, StartOutcome};
pub use error::PlaybackError;
pub use output::RodioOutput;
pub use reporter::ChannelReporter;

// Silence unused dev-dependency warnings for crates only used by integration tests
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tokio_test as _;
