//! End-to-end controller behavior against fake synthesis and audio output.
//!
//! No audio device or network is involved. Segment completion is driven by
//! the test through [`FakeOutput`](common::FakeOutput).

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{Harness, WAIT, id, params};
use narrator_core::{ButtonState, ExtractionConfig, Fallback, Notice, ReporterEvent};
use narrator_playback::{PlayerStatus, ResumeInfo, StartOutcome};

fn texts(plays: &[(String, Option<Duration>)]) -> Vec<&str> {
    plays.iter().map(|(t, _)| t.as_str()).collect()
}

#[tokio::test]
async fn test_segments_advance_automatically_then_go_idle() {
    let mut h = Harness::new();
    let five = id("5");

    let outcome = h.controller.start(&five, "Hello\n\nWorld", &h.params, 0);
    assert_eq!(outcome, StartOutcome::Started { segments: 2, from: 0 });

    h.wait_for(&five, ButtonState::Playing).await;
    assert_eq!(h.controller.status(), PlayerStatus::Playing(0));
    assert_eq!(texts(&h.output.plays()), ["Hello"]);

    h.output.finish(0);
    h.wait_for(&five, ButtonState::Playing).await;
    assert_eq!(h.controller.status(), PlayerStatus::Playing(1));
    assert_eq!(texts(&h.output.plays()), ["Hello", "World"]);

    h.output.finish(1);
    h.wait_for(&five, ButtonState::Idle).await;
    assert_eq!(h.controller.status(), PlayerStatus::Idle);
    assert!(h.controller.active_message().is_none());
    assert!(h.controller.resume_info().is_none());
}

#[tokio::test]
async fn test_next_segment_is_synthesized_once_despite_prefetch() {
    let mut h = Harness::new();
    let five = id("5");

    h.controller.start(&five, "Hello\n\nWorld", &h.params, 0);
    h.wait_for(&five, ButtonState::Playing).await;
    h.synth.wait_called("World").await;

    h.output.finish(0);
    h.wait_for(&five, ButtonState::Playing).await;

    assert_eq!(h.synth.call_count("Hello"), 1);
    assert_eq!(h.synth.call_count("World"), 1);
    assert_eq!(h.controller.cache().len(), 2);
}

#[tokio::test]
async fn test_newer_start_supersedes_pending_segment() {
    let mut h = Harness::new();
    let (five, seven) = (id("5"), id("7"));
    let gate = h.synth.gate("Five");

    h.controller.start(&five, "Five", &h.params, 0);
    h.wait_for(&five, ButtonState::Loading).await;
    h.synth.wait_called("Five").await;

    h.controller.start(&seven, "Seven", &h.params, 0);
    gate.notify_one();

    let mut events = h.wait_for(&seven, ButtonState::Playing).await;
    events.extend(h.drain().await);

    assert!(
        !events
            .iter()
            .any(|e| e.state_for(&five) == Some(ButtonState::Playing)),
        "superseded message reported playing: {events:?}"
    );
    assert_eq!(texts(&h.output.plays()), ["Seven"]);
    assert_eq!(h.controller.active_message(), Some(seven));
    assert_eq!(h.controller.status(), PlayerStatus::Playing(0));
}

#[tokio::test]
async fn test_superseded_synthesis_still_lands_in_cache() {
    let mut h = Harness::new();
    let (five, seven) = (id("5"), id("7"));
    let gate = h.synth.gate("Five");

    h.controller.start(&five, "Five", &h.params, 0);
    h.synth.wait_called("Five").await;
    h.controller.start(&seven, "Seven", &h.params, 0);
    gate.notify_one();
    h.wait_for(&seven, ButtonState::Playing).await;
    h.drain().await;

    // Coming back to message 5 reuses the abandoned result.
    h.controller.start(&five, "Five", &h.params, 0);
    h.wait_for(&five, ButtonState::Playing).await;
    assert_eq!(h.synth.call_count("Five"), 1);
}

#[tokio::test]
async fn test_pause_then_resume_seeks_into_same_segment() {
    let mut h = Harness::new();
    let five = id("5");
    let offset = Duration::from_millis(3200);

    h.controller.start(&five, "One\n\nTwo", &h.params, 0);
    h.wait_for(&five, ButtonState::Playing).await;
    h.output.finish(0);
    h.wait_for(&five, ButtonState::Playing).await;

    h.output.set_position(1, offset);
    assert!(h.controller.pause());
    assert_eq!(
        h.controller.status(),
        PlayerStatus::Paused { index: 1, offset }
    );
    assert_eq!(
        h.controller.resume_info(),
        Some(ResumeInfo {
            message_id: five.clone(),
            index: 1,
            offset,
        })
    );
    assert!(h.output.handle(1).paused.load(Ordering::SeqCst));
    h.wait_for(&five, ButtonState::Paused).await;

    assert!(h.controller.resume());
    h.wait_for(&five, ButtonState::Playing).await;

    let plays = h.output.plays();
    assert_eq!(plays.len(), 3);
    assert_eq!(plays[2], ("Two".to_string(), Some(offset)));
    assert!(h.output.handle(1).stopped.load(Ordering::SeqCst));
    assert_eq!(h.controller.status(), PlayerStatus::Playing(1));
    assert!(h.controller.resume_info().is_none());
}

#[tokio::test]
async fn test_failed_prefetch_is_retried_by_the_next_step() {
    let mut h = Harness::new();
    let five = id("5");
    h.synth.fail_once_on("World");

    h.controller.start(&five, "Hello\n\nWorld", &h.params, 0);
    let mut events = h.wait_for(&five, ButtonState::Playing).await;
    h.synth.wait_called("World").await;
    events.extend(h.drain().await);
    assert_eq!(h.controller.status(), PlayerStatus::Playing(0));
    assert_eq!(h.controller.cache().len(), 1);

    h.output.finish(0);
    events.extend(h.wait_for(&five, ButtonState::Playing).await);

    assert_eq!(texts(&h.output.plays()), ["Hello", "World"]);
    assert_eq!(h.synth.call_count("World"), 2);
    assert_eq!(h.controller.status(), PlayerStatus::Playing(1));
    assert!(
        !events
            .iter()
            .any(|e| e.state_for(&five) == Some(ButtonState::Error)),
        "prefetch failure surfaced as an error: {events:?}"
    );
}

#[tokio::test]
async fn test_dropping_controller_releases_paused_segment() {
    let mut h = Harness::new();
    let five = id("5");

    h.controller.start(&five, "Hello", &h.params, 0);
    h.wait_for(&five, ButtonState::Playing).await;
    assert!(h.controller.pause());

    let handle = h.output.handle(0);
    assert!(!handle.stopped.load(Ordering::SeqCst));
    drop(h);

    tokio::time::timeout(WAIT, async {
        while !handle.stopped.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("paused handle was never stopped");
}

#[tokio::test]
async fn test_pause_without_playback_is_noop() {
    let h = Harness::new();
    assert!(!h.controller.pause());
    assert!(!h.controller.resume());
    assert_eq!(h.controller.status(), PlayerStatus::Idle);
}

#[tokio::test]
async fn test_failed_synthesis_skips_to_next_segment() {
    let mut h = Harness::new();
    let five = id("5");
    h.synth.fail_on("Bad");

    h.controller.start(&five, "Bad\n\nGood", &h.params, 0);
    h.wait_for(&five, ButtonState::Error).await;
    h.wait_for(&five, ButtonState::Playing).await;

    assert_eq!(texts(&h.output.plays()), ["Good"]);
    assert_eq!(h.controller.status(), PlayerStatus::Playing(1));
}

#[tokio::test]
async fn test_failed_playback_skips_to_next_segment() {
    let mut h = Harness::new();
    let five = id("5");

    h.controller.start(&five, "First\n\nSecond", &h.params, 0);
    h.wait_for(&five, ButtonState::Playing).await;

    h.output.fail(0, "device lost");
    h.wait_for(&five, ButtonState::Error).await;
    h.wait_for(&five, ButtonState::Playing).await;

    assert_eq!(texts(&h.output.plays()), ["First", "Second"]);
}

#[tokio::test]
async fn test_output_errors_run_queue_to_the_end() {
    let mut h = Harness::new();
    let five = id("5");
    h.output.break_device();

    h.controller.start(&five, "One\n\nTwo", &h.params, 0);
    let events = h.wait_for(&five, ButtonState::Idle).await;

    let errors = events
        .iter()
        .filter(|e| e.state_for(&five) == Some(ButtonState::Error))
        .count();
    assert_eq!(errors, 2);
    assert!(h.output.plays().is_empty());
    assert_eq!(h.controller.status(), PlayerStatus::Idle);
}

#[tokio::test]
async fn test_empty_text_reports_nothing_to_read() {
    let mut h = Harness::new();
    let five = id("5");

    let outcome = h.controller.start(&five, "  \n\n  ", &h.params, 0);
    assert_eq!(outcome, StartOutcome::NothingToRead);
    assert_eq!(h.controller.status(), PlayerStatus::Idle);

    let events = h.drain().await;
    assert_eq!(
        events,
        [ReporterEvent::Notice(Notice::NothingToRead { message_id: five })]
    );
    assert!(h.synth.calls().is_empty());
}

#[tokio::test]
async fn test_unmatched_marks_with_empty_fallback_read_nothing() {
    let h = Harness::new();
    let marked = params(ExtractionConfig::marked("[", "]").with_fallback(Fallback::Empty));

    let outcome = h.controller.start(&id("5"), "no brackets here", &marked, 0);
    assert_eq!(outcome, StartOutcome::NothingToRead);
}

#[tokio::test]
async fn test_play_from_paragraph_clamps_index() {
    let mut h = Harness::new();
    let five = id("5");

    let outcome = h
        .controller
        .play_from_paragraph(&five, "a\n\nb\n\nc", &h.params, 10);
    assert_eq!(outcome, StartOutcome::Started { segments: 3, from: 2 });

    h.wait_for(&five, ButtonState::Playing).await;
    assert_eq!(texts(&h.output.plays()), ["c"]);
}

#[tokio::test]
async fn test_start_past_end_finishes_immediately() {
    let mut h = Harness::new();
    let five = id("5");

    h.controller.start(&five, "only", &h.params, 4);
    h.wait_for(&five, ButtonState::Idle).await;
    assert!(h.output.plays().is_empty());
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let mut h = Harness::new();
    let five = id("5");

    h.controller.start(&five, "Hello\n\nWorld", &h.params, 0);
    h.wait_for(&five, ButtonState::Playing).await;

    h.controller.stop();
    h.wait_for(&five, ButtonState::Idle).await;
    assert!(h.output.handle(0).stopped.load(Ordering::SeqCst));

    h.controller.stop();
    assert!(h.drain().await.is_empty());
    assert_eq!(h.controller.status(), PlayerStatus::Idle);
}

#[tokio::test]
async fn test_end_event_from_stopped_handle_is_ignored() {
    let mut h = Harness::new();
    let five = id("5");

    h.controller.start(&five, "Hello\n\nWorld", &h.params, 0);
    h.wait_for(&five, ButtonState::Playing).await;
    h.controller.stop();

    h.output.finish(0);
    let events = h.drain().await;

    assert!(
        !events
            .iter()
            .any(|e| e.state_for(&five) == Some(ButtonState::Playing)),
        "stale end advanced the queue: {events:?}"
    );
    assert_eq!(h.output.plays().len(), 1);
    assert_eq!(h.controller.status(), PlayerStatus::Idle);
}

#[tokio::test]
async fn test_restart_bumps_epoch() {
    let h = Harness::new();
    let five = id("5");

    let before = h.controller.epoch();
    h.controller.play_from_start(&five, "Hello", &h.params);
    let after_first = h.controller.epoch();
    h.controller.play_from_start(&five, "Hello", &h.params);

    assert!(after_first > before);
    assert!(h.controller.epoch() > after_first);
}
