//! Channel-backed state reporter.

use narrator_core::{ButtonState, MessageId, Notice, ReporterEvent, StateReporter};
use tokio::sync::mpsc;

/// Forwards every report and notice onto an unbounded channel.
///
/// Sending never blocks, so this is safe to call with the controller's lock
/// held. Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ReporterEvent>,
}

impl ChannelReporter {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReporterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StateReporter for ChannelReporter {
    fn report(&self, message_id: &MessageId, state: ButtonState) {
        let _ = self.tx.send(ReporterEvent::State {
            message_id: message_id.clone(),
            state,
        });
    }

    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(ReporterEvent::Notice(notice));
    }
}
