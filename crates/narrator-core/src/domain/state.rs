//! Button states and informational notices sent to the state reporter.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::segment::MessageId;

/// Visible state of a message's playback button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    /// Nothing active for this message.
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
}

impl ButtonState {
    /// Label used when rendering the button. `Idle` renders as `ready`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle | Self::Ready => "ready",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Informational conditions. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Extraction left nothing to speak; the controller stays idle.
    NothingToRead { message_id: MessageId },
    /// The caller passed something that is not a numeric message id.
    InvalidMessageId { raw: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToRead { message_id } => {
                write!(f, "message {message_id} has nothing to read")
            }
            Self::InvalidMessageId { raw } => write!(f, "invalid message id: {raw:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_renders_as_ready() {
        assert_eq!(ButtonState::Idle.label(), "ready");
        assert_eq!(ButtonState::Playing.to_string(), "playing");
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::NothingToRead {
            message_id: MessageId::parse("9").unwrap(),
        };
        assert_eq!(notice.to_string(), "message 9 has nothing to read");
    }
}
