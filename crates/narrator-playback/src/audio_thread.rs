//! Dedicated audio thread owning the `rodio` output stream.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so it lives on one OS
//! thread for its whole life. Everything else talks to that thread through
//! [`AudioThreadHandle`], which only ever hands back `Send` values (sinks).

use std::sync::mpsc;
use std::thread;

use rodio::{OutputStream, Sink};
use tracing::{debug, info};

use crate::error::PlaybackError;

enum AudioCommand {
    /// Create a fresh, empty sink on the output stream.
    OpenSink {
        reply: mpsc::Sender<Result<Sink, PlaybackError>>,
    },

    Shutdown,
}

/// `Send + Sync` proxy to the audio thread.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread and open the default output device on it.
    ///
    /// Device errors are sent back over a one-shot init channel.
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), PlaybackError>>();

        let thread = thread::Builder::new()
            .name("narrator-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| PlaybackError::Output(format!("failed to spawn audio thread: {e}")))?;

        init_rx.recv().map_err(|_| PlaybackError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Ask the audio thread for a new sink.
    pub fn open_sink(&self) -> Result<Sink, PlaybackError> {
        let (reply, rx) = mpsc::channel();
        self.cmd_tx
            .send(AudioCommand::OpenSink { reply })
            .map_err(|_| PlaybackError::AudioThreadDied)?;
        rx.recv().map_err(|_| PlaybackError::AudioThreadDied)?
    }

    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), PlaybackError>>) {
        let (_stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(PlaybackError::Output(e.to_string())));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }
        info!("Audio output initialized on default device");

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::OpenSink { reply } => {
                    let sink = Sink::try_new(&stream_handle)
                        .map_err(|e| PlaybackError::Output(e.to_string()));
                    let _ = reply.send(sink);
                }
                AudioCommand::Shutdown => break,
            }
        }

        debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
