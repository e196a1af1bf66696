//! Segments, playback parameter snapshots and segment cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::extract::{ExtractionConfig, ResultMode, extract};
use super::paragraph::split_paragraphs;
use super::persona::PersonaKey;
use crate::ports::VoiceParams;

/// Numeric chat message identifier, as rendered by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Parse a message id; only non-empty ASCII digit strings are valid.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One paragraph of a message, synthesized and played independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub message_id: MessageId,
    /// Paragraph position within the message.
    pub index: usize,
    /// Never empty.
    pub text: String,
    pub mode: ResultMode,
}

/// Everything that influences what a queue sounds like, captured once per
/// queue build and never re-read while that queue plays.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackParams {
    pub voice: VoiceParams,
    pub persona_key: PersonaKey,
    pub extract: ExtractionConfig,
}

impl PlaybackParams {
    #[must_use]
    pub const fn new(voice: VoiceParams, persona_key: PersonaKey, extract: ExtractionConfig) -> Self {
        Self {
            voice,
            persona_key,
            extract,
        }
    }
}

/// Deterministic fingerprint of a segment plus every parameter that affects
/// its synthesized audio.
///
/// Equal keys must resolve to the same audio. The paragraph text digest is
/// part of the key so an edited message never reuses stale audio.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn new(segment: &Segment, params: &PlaybackParams) -> Self {
        let voice = &params.voice;
        let cfg = &params.extract;
        Self(format!(
            "{}|p{}|{}|{}|{}|{}|{}|fmt:{}|em:{}|s:{}|e:{}|re:{}|fb:{}|sc:{}|t:{}",
            segment.message_id,
            segment.index,
            segment.mode,
            voice.voice,
            voice.speed,
            voice.gain,
            params.persona_key,
            voice.response_format,
            cfg.mode,
            cfg.start.trim(),
            cfg.end.trim(),
            cfg.regex.trim(),
            cfg.fallback,
            u8::from(cfg.skip_code_blocks),
            short_digest(&segment.text, 16),
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hash of the key, for log lines.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        short_digest(&self.0, 12)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn short_digest(input: &str, len: usize) -> String {
    let mut hex = format!("{:x}", Sha256::digest(input.as_bytes()));
    hex.truncate(len);
    hex
}

/// Ordered segments for one message, plus the extraction tag that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechQueue {
    pub message_id: MessageId,
    pub mode: ResultMode,
    pub segments: Vec<Segment>,
}

impl SpeechQueue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

/// Extract the speakable text of a message and split it into segments.
#[must_use]
pub fn build_queue(message_id: &MessageId, raw: &str, cfg: &ExtractionConfig) -> SpeechQueue {
    let extracted = extract(raw, cfg);
    let text = extracted.text.trim();

    let segments = if text.is_empty() {
        Vec::new()
    } else {
        split_paragraphs(text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Segment {
                message_id: message_id.clone(),
                index,
                text,
                mode: extracted.mode,
            })
            .collect()
    };

    SpeechQueue {
        message_id: message_id.clone(),
        mode: extracted.mode,
        segments,
    }
}
