//! Playback queue controller.
//!
//! One controller drives at most one message at a time:
//!
//! ```text
//!   Idle → Loading(i) → Playing(i) → Loading(i+1) → … → Idle
//!                          │  ▲
//!                  pause   ▼  │ resume (same message)
//!                        Paused
//! ```
//!
//! All state lives behind a single mutex and every transition happens while
//! holding it. Work that has to wait (synthesis) runs in spawned steps that
//! remember the epoch they were started under; when they wake up under a
//! different epoch they drop their result without touching anything.
//! Segment completion arrives from the audio output as an end notice on a
//! channel and is handled by a driver task.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use narrator_core::{
    AudioArtifact, AudioOutput, CacheKey, FinishCallback, MessageId, Notice, PlaybackEnd,
    PlaybackParams, Segment, SpeechSynthesizer, StateReporter, SynthesisError, VoiceParams,
    build_queue,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::cache::SegmentCache;

use state::{ActiveHandle, ActiveQueue, PlayerState};
pub use state::{PlayerStatus, ResumeInfo};

// ── Public outcomes ────────────────────────────────────────────────

/// Result of starting a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { segments: usize, from: usize },

    /// Extraction produced no text. The player is idle.
    NothingToRead,
}

/// What a primary action (button click) ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryOutcome {
    Paused,
    Resumed,
    Started { segments: usize },
    NothingToRead,
    InvalidMessageId,
}

// ── Internals ──────────────────────────────────────────────────────

/// Sent by a playback handle's finish callback.
#[derive(Debug)]
struct EndNotice {
    epoch: u64,
    token: u64,
    index: usize,
    outcome: PlaybackEnd,
}

/// Everything a step needs to fetch one segment without holding the lock.
struct SegmentJob {
    key: CacheKey,
    text: String,
    voice: VoiceParams,
}

enum StepFlow {
    Done,
    /// Segment could not be played; continue with the next one.
    Skip,
}

#[derive(Clone, Copy)]
enum StartAt {
    Index(usize),
    /// Clamp into the queue.
    Paragraph(usize),
}

struct Inner {
    cache: Arc<SegmentCache>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output: Arc<dyn AudioOutput>,
    reporter: Arc<dyn StateReporter>,
    state: Mutex<PlayerState>,
    ends: mpsc::UnboundedSender<EndNotice>,
    runtime: Handle,
}

/// Drives sequential playback of one message's paragraphs.
///
/// Cheap to clone; clones share the same player.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

impl PlaybackController {
    /// Create a controller on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        output: Arc<dyn AudioOutput>,
        reporter: Arc<dyn StateReporter>,
        cache: Arc<SegmentCache>,
    ) -> Self {
        let (ends, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            cache,
            synthesizer,
            output,
            reporter,
            state: Mutex::new(PlayerState::default()),
            ends,
            runtime: Handle::current(),
        });

        inner
            .runtime
            .spawn(drive_segment_ends(Arc::downgrade(&inner), rx));

        Self { inner }
    }

    /// Stop whatever is active, build a fresh queue for `message_id` and
    /// start playing it at `from_index`.
    pub fn start(
        &self,
        message_id: &MessageId,
        raw_text: &str,
        params: &PlaybackParams,
        from_index: usize,
    ) -> StartOutcome {
        self.inner
            .start(message_id, raw_text, params, StartAt::Index(from_index))
    }

    pub fn play_from_start(
        &self,
        message_id: &MessageId,
        raw_text: &str,
        params: &PlaybackParams,
    ) -> StartOutcome {
        self.start(message_id, raw_text, params, 0)
    }

    /// Like [`start`](Self::start) but clamps `index` into the queue.
    pub fn play_from_paragraph(
        &self,
        message_id: &MessageId,
        raw_text: &str,
        params: &PlaybackParams,
        index: usize,
    ) -> StartOutcome {
        self.inner
            .start(message_id, raw_text, params, StartAt::Paragraph(index))
    }

    /// Pause the playing segment. Between segments, holds the queue at the
    /// segment being loaded. Returns `false` if nothing was playing.
    pub fn pause(&self) -> bool {
        self.inner.pause_locked(&mut self.inner.lock())
    }

    /// Continue a paused message where it stopped. Returns `false` if there
    /// is nothing to resume.
    pub fn resume(&self) -> bool {
        self.inner.resume_locked(&mut self.inner.lock())
    }

    /// Stop playback and forget the active message. Safe to call repeatedly.
    pub fn stop(&self) {
        self.inner.stop_locked(&mut self.inner.lock());
    }

    /// Single entry point for a message's play button.
    ///
    /// Clicking the active message toggles pause and resume, keeping the
    /// queue position even between segments. Clicking any other message, or
    /// the active one before anything of it has played or right after a
    /// failure, restarts from the first paragraph.
    pub fn handle_primary_action(
        &self,
        raw_message_id: &str,
        raw_text: &str,
        params: &PlaybackParams,
    ) -> PrimaryOutcome {
        let Some(message_id) = MessageId::parse(raw_message_id) else {
            tracing::warn!(raw = raw_message_id, "Ignoring click with invalid message id");
            self.inner.reporter.notify(Notice::InvalidMessageId {
                raw: raw_message_id.to_string(),
            });
            return PrimaryOutcome::InvalidMessageId;
        };

        {
            let mut state = self.inner.lock();
            if state.active_message() == Some(&message_id) {
                let status = state.status;
                match status {
                    PlayerStatus::Playing(_) | PlayerStatus::Loading(_)
                        if self.inner.pause_locked(&mut state) =>
                    {
                        return PrimaryOutcome::Paused;
                    }
                    PlayerStatus::Paused { .. } if self.inner.resume_locked(&mut state) => {
                        return PrimaryOutcome::Resumed;
                    }
                    _ => {}
                }
            }
        }

        match self.play_from_start(&message_id, raw_text, params) {
            StartOutcome::Started { segments, .. } => PrimaryOutcome::Started { segments },
            StartOutcome::NothingToRead => PrimaryOutcome::NothingToRead,
        }
    }

    #[must_use]
    pub fn status(&self) -> PlayerStatus {
        self.inner.lock().status
    }

    #[must_use]
    pub fn active_message(&self) -> Option<MessageId> {
        self.inner.lock().active_message().cloned()
    }

    #[must_use]
    pub fn resume_info(&self) -> Option<ResumeInfo> {
        self.inner.lock().resume.clone()
    }

    /// Current supersession epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SegmentCache> {
        &self.inner.cache
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("PlaybackController")
            .field("epoch", &state.epoch)
            .field("status", &state.status)
            .field("message", &state.active_message())
            .finish_non_exhaustive()
    }
}

async fn drive_segment_ends(inner: Weak<Inner>, mut rx: mpsc::UnboundedReceiver<EndNotice>) {
    while let Some(notice) = rx.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.on_segment_end(notice);
    }
    tracing::debug!("Segment end driver exiting");
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, message_id: &MessageId, status: PlayerStatus) {
        tracing::debug!(message_id = %message_id, ?status, "Player state transition");
        self.reporter.report(message_id, status.button_state());
    }

    // ── Queue lifecycle ────────────────────────────────────────────

    fn start(
        self: &Arc<Self>,
        message_id: &MessageId,
        raw_text: &str,
        params: &PlaybackParams,
        at: StartAt,
    ) -> StartOutcome {
        let queue = build_queue(message_id, raw_text, &params.extract);

        let mut state = self.lock();
        self.stop_locked(&mut state);

        if queue.is_empty() {
            tracing::info!(message_id = %message_id, "Nothing to read");
            self.reporter.notify(Notice::NothingToRead {
                message_id: message_id.clone(),
            });
            return StartOutcome::NothingToRead;
        }

        let segments = queue.len();
        let from = match at {
            StartAt::Index(i) => i,
            StartAt::Paragraph(i) => i.min(segments - 1),
        };

        state.queue = Some(ActiveQueue {
            message_id: message_id.clone(),
            segments: queue.segments,
            params: params.clone(),
            started: false,
        });
        state.status = PlayerStatus::Loading(from);
        let epoch = state.epoch;

        tracing::info!(
            message_id = %message_id,
            segments,
            from,
            mode = queue.mode.as_str(),
            epoch,
            "Starting message"
        );
        self.spawn_step(epoch, from, None);

        StartOutcome::Started { segments, from }
    }

    fn stop_locked(&self, state: &mut PlayerState) {
        state.bump_epoch();
        state.stop_handle();
        state.resume = None;
        state.pending_seek = None;
        state.status = PlayerStatus::Idle;

        if let Some(previous) = state.queue.take() {
            self.report(&previous.message_id, PlayerStatus::Idle);
        }
    }

    fn pause_locked(&self, state: &mut PlayerState) -> bool {
        let Some(message_id) = state.active_message().cloned() else {
            return false;
        };

        let (index, offset) = match (state.status, state.handle.as_ref()) {
            (PlayerStatus::Playing(index), Some(active)) => {
                let offset = active.handle.position();
                active.handle.pause();
                (index, offset)
            }
            // Between segments: the previous one ended and the next is on
            // its way. Hold the queue at the upcoming segment.
            (PlayerStatus::Playing(index), None) => {
                state.bump_epoch();
                (index + 1, Duration::ZERO)
            }
            (PlayerStatus::Loading(index), None)
                if state.queue.as_ref().is_some_and(|q| q.started) =>
            {
                state.bump_epoch();
                (index, state.pending_seek.take().unwrap_or_default())
            }
            _ => return false,
        };

        state.resume = Some(ResumeInfo {
            message_id: message_id.clone(),
            index,
            offset,
        });
        state.status = PlayerStatus::Paused { index, offset };
        self.report(&message_id, state.status);
        true
    }

    /// Resuming replaces the paused handle with a fresh one seeked to the
    /// saved offset, under a new epoch.
    fn resume_locked(self: &Arc<Self>, state: &mut PlayerState) -> bool {
        let Some(info) = state.resume.clone() else {
            return false;
        };
        if state.active_message() != Some(&info.message_id) {
            tracing::debug!(message_id = %info.message_id, "Resume info belongs to another message");
            return false;
        }

        state.resume = None;
        let epoch = state.bump_epoch();
        state.stop_handle();
        state.status = PlayerStatus::Loading(info.index);

        tracing::debug!(
            message_id = %info.message_id,
            index = info.index,
            offset = ?info.offset,
            "Resuming"
        );
        let seek = Some(info.offset).filter(|offset| !offset.is_zero());
        state.pending_seek = seek;
        self.spawn_step(epoch, info.index, seek);
        true
    }

    // ── Sequential steps ───────────────────────────────────────────

    fn spawn_step(self: &Arc<Self>, epoch: u64, index: usize, seek: Option<Duration>) {
        self.runtime
            .spawn(Arc::clone(self).run_step(epoch, index, seek));
    }

    async fn run_step(self: Arc<Self>, epoch: u64, mut index: usize, mut seek: Option<Duration>) {
        loop {
            let Some(job) = self.begin_segment(epoch, index) else {
                return;
            };
            let fetched = self.fetch(&job).await;
            match self.play_segment(epoch, index, seek, fetched) {
                StepFlow::Done => return,
                StepFlow::Skip => {
                    index += 1;
                    seek = None;
                }
            }
        }
    }

    /// Enter `Loading(index)`, or finish the queue when `index` is past the end.
    fn begin_segment(&self, epoch: u64, index: usize) -> Option<SegmentJob> {
        let mut state = self.lock();
        if state.epoch != epoch {
            tracing::debug!(epoch, current = state.epoch, "Step superseded before loading");
            return None;
        }

        let next = {
            let queue = state.queue.as_ref()?;
            queue
                .segments
                .get(index)
                .map(|segment| (queue.message_id.clone(), job_for(segment, &queue.params)))
        };
        let Some((message_id, job)) = next else {
            tracing::info!(index, "Reached end of message");
            self.stop_locked(&mut state);
            return None;
        };

        state.status = PlayerStatus::Loading(index);
        self.report(&message_id, state.status);
        Some(job)
    }

    async fn fetch(&self, job: &SegmentJob) -> Result<Arc<AudioArtifact>, SynthesisError> {
        let synthesizer = Arc::clone(&self.synthesizer);
        let text = job.text.clone();
        let voice = job.voice.clone();
        self.cache
            .get_or_create(&job.key, move || async move {
                synthesizer.synthesize(&text, &voice).await
            })
            .await
    }

    fn play_segment(
        self: &Arc<Self>,
        epoch: u64,
        index: usize,
        seek: Option<Duration>,
        fetched: Result<Arc<AudioArtifact>, SynthesisError>,
    ) -> StepFlow {
        let mut state = self.lock();
        if state.epoch != epoch {
            tracing::debug!(epoch, current = state.epoch, index, "Abandoning superseded step");
            return StepFlow::Done;
        }
        let Some(message_id) = state.active_message().cloned() else {
            return StepFlow::Done;
        };
        state.pending_seek = None;

        let artifact = match fetched {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!(message_id = %message_id, index, error = %e, "Segment synthesis failed, skipping");
                state.status = PlayerStatus::Error(index);
                self.report(&message_id, state.status);
                return StepFlow::Skip;
            }
        };

        state.stop_handle();
        let token = state.next_token();
        let ends = self.ends.clone();
        let on_end: FinishCallback = Box::new(move |outcome| {
            let _ = ends.send(EndNotice {
                epoch,
                token,
                index,
                outcome,
            });
        });

        match self.output.play(&artifact, seek, on_end) {
            Ok(handle) => {
                state.handle = Some(ActiveHandle { token, handle });
                if let Some(queue) = state.queue.as_mut() {
                    queue.started = true;
                }
                state.status = PlayerStatus::Playing(index);
                self.report(&message_id, state.status);
                let upcoming = state
                    .queue
                    .as_ref()
                    .and_then(|q| q.segments.get(index + 1).map(|s| job_for(s, &q.params)));
                drop(state);

                if let Some(job) = upcoming {
                    self.spawn_prefetch(job, index + 1);
                }
                StepFlow::Done
            }
            Err(e) => {
                tracing::warn!(message_id = %message_id, index, error = %e, "Audio output failed, skipping");
                state.status = PlayerStatus::Error(index);
                self.report(&message_id, state.status);
                StepFlow::Skip
            }
        }
    }

    fn spawn_prefetch(self: &Arc<Self>, job: SegmentJob, index: usize) {
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            if let Err(e) = inner.fetch(&job).await {
                tracing::debug!(index, error = %e, "Prefetch failed");
            }
        });
    }

    // ── Completion events ──────────────────────────────────────────

    fn on_segment_end(self: &Arc<Self>, notice: EndNotice) {
        let mut state = self.lock();
        if state.epoch != notice.epoch || !state.owns(notice.token) {
            tracing::trace!(index = notice.index, "Ignoring stale segment end");
            return;
        }
        if matches!(state.status, PlayerStatus::Paused { .. }) {
            return;
        }

        state.handle = None;
        if let PlaybackEnd::Failed(reason) = &notice.outcome {
            if let Some(message_id) = state.active_message().cloned() {
                tracing::warn!(message_id = %message_id, index = notice.index, %reason, "Playback failed, skipping");
                state.status = PlayerStatus::Error(notice.index);
                self.report(&message_id, state.status);
            }
        }

        self.spawn_step(notice.epoch, notice.index + 1, None);
    }
}

impl Drop for Inner {
    /// A paused handle has no step or watcher left to release it.
    fn drop(&mut self) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .stop_handle();
    }
}

fn job_for(segment: &Segment, params: &PlaybackParams) -> SegmentJob {
    SegmentJob {
        key: CacheKey::new(segment, params),
        text: segment.text.clone(),
        voice: params.voice.clone(),
    }
}
