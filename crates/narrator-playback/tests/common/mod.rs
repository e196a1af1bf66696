//! Fakes shared by the controller integration tests.
//!
//! - [`FakeSynth`]: records every call, can hold a text behind a gate and
//!   can fail chosen texts, always or just once.
//! - [`FakeOutput`]: records every play request and lets the test finish,
//!   fail or reposition any handle it created.
//! - [`Harness`]: a controller wired to both fakes plus a channel reporter.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use narrator_core::{
    AudioArtifact, AudioOutput, AudioOutputError, ButtonState, ExtractionConfig, FinishCallback,
    MessageId, PersonaKey, PlaybackEnd, PlaybackHandle, PlaybackParams, ReporterEvent,
    SpeechSynthesizer, SynthesisError, VoiceParams,
};
use narrator_playback::{ChannelReporter, PlaybackController, SegmentCache};
use tokio::sync::{Notify, mpsc};

pub const WAIT: Duration = Duration::from_secs(5);

// ── Synthesizer ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSynth {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    failing_once: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeSynth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, text: &str) {
        self.failing.lock().unwrap().insert(text.to_string());
    }

    /// Fail only the next synthesis of `text`.
    pub fn fail_once_on(&self, text: &str) {
        self.failing_once.lock().unwrap().insert(text.to_string());
    }

    /// Hold synthesis of `text` until the returned gate is notified.
    pub fn gate(&self, text: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(text.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, text: &str) -> usize {
        self.calls().iter().filter(|t| *t == text).count()
    }

    /// Wait until synthesis of `text` has started at least once.
    pub async fn wait_called(&self, text: &str) {
        tokio::time::timeout(WAIT, async {
            while self.call_count(text) == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("synthesis of {text:?} never started"));
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynth {
    async fn synthesize(
        &self,
        text: &str,
        _params: &VoiceParams,
    ) -> Result<AudioArtifact, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());

        let gate = self.gates.lock().unwrap().get(text).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let fail_now = self.failing_once.lock().unwrap().remove(text);
        if fail_now || self.failing.lock().unwrap().contains(text) {
            return Err(SynthesisError::Backend {
                status: 500,
                body: format!("cannot speak {text}"),
            });
        }
        Ok(AudioArtifact::new(text.as_bytes().to_vec(), "mp3"))
    }
}

// ── Audio output ───────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeHandleState {
    pub paused: AtomicBool,
    pub stopped: AtomicBool,
    position: Mutex<Duration>,
}

struct FakeHandle(Arc<FakeHandleState>);

impl PlaybackHandle for FakeHandle {
    fn pause(&self) {
        self.0.paused.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.0.stopped.store(true, Ordering::SeqCst);
    }

    fn position(&self) -> Duration {
        *self.0.position.lock().unwrap()
    }
}

struct PlayRecord {
    text: String,
    seek: Option<Duration>,
    on_end: Option<FinishCallback>,
    handle: Arc<FakeHandleState>,
}

#[derive(Default)]
pub struct FakeOutput {
    plays: Mutex<Vec<PlayRecord>>,
    broken: AtomicBool,
}

impl FakeOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent `play` call fail.
    pub fn break_device(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// `(text, seek)` of every play request so far.
    pub fn plays(&self) -> Vec<(String, Option<Duration>)> {
        self.plays
            .lock()
            .unwrap()
            .iter()
            .map(|p| (p.text.clone(), p.seek))
            .collect()
    }

    pub fn handle(&self, n: usize) -> Arc<FakeHandleState> {
        Arc::clone(&self.plays.lock().unwrap()[n].handle)
    }

    pub fn set_position(&self, n: usize, position: Duration) {
        *self.handle(n).position.lock().unwrap() = position;
    }

    /// Report play request `n` as finished, ignoring whether it was stopped.
    pub fn finish(&self, n: usize) {
        self.end(n, PlaybackEnd::Finished);
    }

    pub fn fail(&self, n: usize, reason: &str) {
        self.end(n, PlaybackEnd::Failed(reason.to_string()));
    }

    fn end(&self, n: usize, outcome: PlaybackEnd) {
        let callback = self.plays.lock().unwrap()[n].on_end.take();
        if let Some(callback) = callback {
            callback(outcome);
        }
    }
}

impl AudioOutput for FakeOutput {
    fn play(
        &self,
        artifact: &AudioArtifact,
        seek: Option<Duration>,
        on_end: FinishCallback,
    ) -> Result<Box<dyn PlaybackHandle>, AudioOutputError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(AudioOutputError::Device("unplugged".into()));
        }

        let handle = Arc::new(FakeHandleState::default());
        self.plays.lock().unwrap().push(PlayRecord {
            text: String::from_utf8_lossy(artifact.bytes()).into_owned(),
            seek,
            on_end: Some(on_end),
            handle: Arc::clone(&handle),
        });
        Ok(Box::new(FakeHandle(handle)))
    }
}

// ── Harness ────────────────────────────────────────────────────────

pub struct Harness {
    pub controller: PlaybackController,
    pub synth: Arc<FakeSynth>,
    pub output: Arc<FakeOutput>,
    pub events: mpsc::UnboundedReceiver<ReporterEvent>,
    pub params: PlaybackParams,
}

impl Harness {
    pub fn new() -> Self {
        let synth = FakeSynth::new();
        let output = FakeOutput::new();
        let (reporter, events) = ChannelReporter::new();
        let controller = PlaybackController::new(
            Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>,
            Arc::clone(&output) as Arc<dyn AudioOutput>,
            Arc::new(reporter),
            Arc::new(SegmentCache::new()),
        );

        Self {
            controller,
            synth,
            output,
            events,
            params: params(ExtractionConfig::full()),
        }
    }

    /// Consume events until `message_id` reports `state`. Returns everything
    /// consumed, the matching event included.
    pub async fn wait_for(&mut self, message_id: &MessageId, state: ButtonState) -> Vec<ReporterEvent> {
        let mut seen = Vec::new();
        let found = tokio::time::timeout(WAIT, async {
            while let Some(event) = self.events.recv().await {
                let hit = event.state_for(message_id) == Some(state);
                seen.push(event);
                if hit {
                    return true;
                }
            }
            false
        })
        .await;

        assert!(
            matches!(found, Ok(true)),
            "never saw {state:?} for message {message_id}; events: {seen:?}"
        );
        seen
    }

    /// Let spawned work settle, then return whatever was reported meanwhile.
    pub async fn drain(&mut self) -> Vec<ReporterEvent> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut seen = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            seen.push(event);
        }
        seen
    }
}

pub fn params(extract: ExtractionConfig) -> PlaybackParams {
    PlaybackParams::new(
        VoiceParams::new("alex", 1.0, 0.0),
        PersonaKey::global(),
        extract,
    )
}

pub fn id(raw: &str) -> MessageId {
    MessageId::parse(raw).unwrap()
}
