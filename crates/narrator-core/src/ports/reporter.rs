//! Button state reporter port.

use crate::domain::{ButtonState, MessageId, Notice};

/// Sink for button state transitions and informational notices.
///
/// The controller calls into the reporter while it holds its state lock, so
/// implementations must return promptly and must not call back into the
/// controller. Forwarding onto a channel is the usual shape.
pub trait StateReporter: Send + Sync {
    fn report(&self, message_id: &MessageId, state: ButtonState);

    fn notify(&self, notice: Notice);
}

/// A reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl NoopReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl StateReporter for NoopReporter {
    fn report(&self, _message_id: &MessageId, _state: ButtonState) {}

    fn notify(&self, _notice: Notice) {}
}

/// One reporter call, as a value. Used by channel-backed reporters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterEvent {
    State {
        message_id: MessageId,
        state: ButtonState,
    },
    Notice(Notice),
}

impl ReporterEvent {
    /// The reported state, if this is a state event for `message_id`.
    #[must_use]
    pub fn state_for(&self, message_id: &MessageId) -> Option<ButtonState> {
        match self {
            Self::State {
                message_id: id,
                state,
            } if id == message_id => Some(*state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_reporter() {
        let reporter = NoopReporter::new();
        let id = MessageId::parse("1").unwrap();

        // Should not panic
        reporter.report(&id, ButtonState::Loading);
        reporter.notify(Notice::InvalidMessageId { raw: "x".into() });
    }

    #[test]
    fn test_state_for_filters_by_message() {
        let five = MessageId::parse("5").unwrap();
        let seven = MessageId::parse("7").unwrap();
        let event = ReporterEvent::State {
            message_id: five.clone(),
            state: ButtonState::Playing,
        };
        assert_eq!(event.state_for(&five), Some(ButtonState::Playing));
        assert_eq!(event.state_for(&seven), None);
    }
}
