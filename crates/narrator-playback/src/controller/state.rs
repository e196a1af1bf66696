//! Player state owned by the controller.

use std::time::Duration;

use narrator_core::{ButtonState, MessageId, PlaybackHandle, PlaybackParams, Segment};

/// Where the player is, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Idle,

    /// Waiting for the artifact of segment `n`.
    Loading(usize),

    Playing(usize),

    Paused { index: usize, offset: Duration },

    /// Segment `n` failed; the queue moves on to the next one.
    Error(usize),
}

impl PlayerStatus {
    /// Button state shown for the active message while in this status.
    #[must_use]
    pub const fn button_state(self) -> ButtonState {
        match self {
            Self::Idle => ButtonState::Idle,
            Self::Loading(_) => ButtonState::Loading,
            Self::Playing(_) => ButtonState::Playing,
            Self::Paused { .. } => ButtonState::Paused,
            Self::Error(_) => ButtonState::Error,
        }
    }

    /// Segment index the status refers to, if any.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Loading(i) | Self::Playing(i) | Self::Error(i) | Self::Paused { index: i, .. } => {
                Some(i)
            }
        }
    }
}

/// Where to pick up again after a pause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeInfo {
    pub message_id: MessageId,
    pub index: usize,
    pub offset: Duration,
}

/// The frozen queue of the active message.
pub(super) struct ActiveQueue {
    pub message_id: MessageId,
    pub segments: Vec<Segment>,
    pub params: PlaybackParams,
    /// Set once any segment of this queue has reached the output.
    pub started: bool,
}

/// The audio handle currently owned by the player.
pub(super) struct ActiveHandle {
    /// Only completion events carrying this token may advance the queue.
    pub token: u64,
    pub handle: Box<dyn PlaybackHandle>,
}

#[derive(Default)]
pub(super) struct PlayerState {
    /// Bumped whenever in-flight steps must be abandoned.
    pub epoch: u64,
    pub queue: Option<ActiveQueue>,
    pub handle: Option<ActiveHandle>,
    pub status: PlayerStatus,
    pub resume: Option<ResumeInfo>,
    /// Offset a resumed segment will seek to once it is loaded.
    pub pending_seek: Option<Duration>,
    next_token: u64,
}

impl PlayerState {
    pub fn active_message(&self) -> Option<&MessageId> {
        self.queue.as_ref().map(|q| &q.message_id)
    }

    pub const fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    pub const fn next_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    /// Stop and drop the owned handle, if any.
    pub fn stop_handle(&mut self) {
        if let Some(active) = self.handle.take() {
            active.handle.stop();
        }
    }

    /// Whether `token` belongs to the handle the player currently owns.
    pub fn owns(&self, token: u64) -> bool {
        self.handle.as_ref().is_some_and(|h| h.token == token)
    }
}
