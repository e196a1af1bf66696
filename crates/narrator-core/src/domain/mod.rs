//! Domain model: extraction, paragraphs, segments, personas and button states.

mod extract;
mod paragraph;
mod persona;
mod segment;
mod state;

pub use extract::{ExtractMode, ExtractionConfig, ExtractionResult, Fallback, ResultMode, extract};
pub use paragraph::split_paragraphs;
pub use persona::{ChatContext, PersonaKey};
pub use segment::{CacheKey, MessageId, PlaybackParams, Segment, SpeechQueue, build_queue};
pub use state::{ButtonState, Notice};
