//! Text extraction: decide which part of a chat message is read aloud.
//!
//! Extraction runs once over the whole message, before paragraph splitting.
//! The [`ResultMode`] of the outcome records which rule actually fired and is
//! part of the segment cache key, so identical text extracted under different
//! effective rules never shares synthesized audio.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Extraction rule selected by the user for a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Read the whole message.
    Full,
    /// Read only text between the start/end marks.
    Marked,
    /// Read only regex matches (capture group 1 when present).
    Regex,
    /// Drop code fences and block quotes, read the rest.
    Smart,
    /// Same as `Marked`; the default when nothing was configured.
    #[default]
    Inherit,
}

impl ExtractMode {
    /// Stable lowercase label, used in cache keys and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Marked => "marked",
            Self::Regex => "regex",
            Self::Smart => "smart",
            Self::Inherit => "inherit",
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "marked" => Ok(Self::Marked),
            "regex" => Ok(Self::Regex),
            "smart" => Ok(Self::Smart),
            "inherit" => Ok(Self::Inherit),
            other => Err(format!("unknown extract mode '{other}'")),
        }
    }
}

/// What to read when the configured rule finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Fall back to the whole message.
    #[default]
    Full,
    /// Read nothing.
    Empty,
}

impl Fallback {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "empty" => Ok(Self::Empty),
            other => Err(format!("unknown fallback '{other}'")),
        }
    }
}

/// Effective extraction configuration, snapshotted when a queue is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    pub mode: ExtractMode,
    pub start: String,
    pub end: String,
    pub regex: String,
    pub fallback: Fallback,
    pub skip_code_blocks: bool,
}

impl ExtractionConfig {
    /// Config that reads every message in full.
    #[must_use]
    pub fn full() -> Self {
        Self {
            mode: ExtractMode::Full,
            ..Self::default()
        }
    }

    /// Config that reads text between `start` and `end`.
    #[must_use]
    pub fn marked(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            mode: ExtractMode::Marked,
            start: start.into(),
            end: end.into(),
            ..Self::default()
        }
    }

    /// Config that reads every match of `pattern`.
    #[must_use]
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            mode: ExtractMode::Regex,
            regex: pattern.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub const fn with_skip_code_blocks(mut self, skip: bool) -> Self {
        self.skip_code_blocks = skip;
        self
    }
}

/// The rule that actually produced an [`ExtractionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultMode {
    None,
    Full,
    Smart,
    Regex,
    Marked,
}

impl ResultMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Full => "full",
            Self::Smart => "smart",
            Self::Regex => "regex",
            Self::Marked => "marked",
        }
    }
}

impl fmt::Display for ResultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speakable text plus the tag of the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub mode: ResultMode,
    pub text: String,
}

impl ExtractionResult {
    fn none() -> Self {
        Self {
            mode: ResultMode::None,
            text: String::new(),
        }
    }

    fn new(mode: ResultMode, text: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
        }
    }

    /// Whether there is anything to read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract the speakable part of `raw` according to `cfg`.
///
/// Never fails: a malformed regex or a rule that matches nothing resolves
/// through `cfg.fallback`.
#[must_use]
pub fn extract(raw: &str, cfg: &ExtractionConfig) -> ExtractionResult {
    if raw.trim().is_empty() {
        return ExtractionResult::none();
    }

    match cfg.mode {
        ExtractMode::Full => ExtractionResult::new(ResultMode::Full, raw),
        ExtractMode::Smart => extract_smart(raw, cfg),
        ExtractMode::Regex => extract_regex(raw, cfg),
        ExtractMode::Marked | ExtractMode::Inherit => extract_marked(raw, cfg),
    }
}

fn apply_fallback(raw: &str, fallback: Fallback) -> ExtractionResult {
    match fallback {
        Fallback::Full => ExtractionResult::new(ResultMode::Full, raw),
        Fallback::Empty => ExtractionResult::none(),
    }
}

fn extract_smart(raw: &str, cfg: &ExtractionConfig) -> ExtractionResult {
    let mut text = if cfg.skip_code_blocks {
        strip_fenced_code(raw).trim().to_string()
    } else {
        raw.to_string()
    };
    text = strip_quote_lines(&text).trim().to_string();

    if text.is_empty() {
        return apply_fallback(raw, cfg.fallback);
    }
    ExtractionResult::new(ResultMode::Smart, text)
}

fn extract_regex(raw: &str, cfg: &ExtractionConfig) -> ExtractionResult {
    let pattern = cfg.regex.trim();
    if pattern.is_empty() {
        return apply_fallback(raw, cfg.fallback);
    }

    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::debug!(pattern, error = %e, "Invalid extraction regex, using fallback");
            return apply_fallback(raw, cfg.fallback);
        }
    };

    let matches: Vec<&str> = re
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    if matches.is_empty() {
        return apply_fallback(raw, cfg.fallback);
    }
    ExtractionResult::new(ResultMode::Regex, matches.join(" "))
}

fn extract_marked(raw: &str, cfg: &ExtractionConfig) -> ExtractionResult {
    let start = cfg.start.trim();
    let mut end = cfg.end.trim();
    if start.is_empty() || end.is_empty() {
        return apply_fallback(raw, cfg.fallback);
    }

    if start == end {
        if let Some(pair) = paired_quote(start) {
            end = pair;
        }
    }

    let parts = if start == end {
        between_same_marker(raw, start)
    } else {
        between_markers(raw, start, end)
    };

    if parts.is_empty() {
        return apply_fallback(raw, cfg.fallback);
    }
    ExtractionResult::new(ResultMode::Marked, parts.join(" "))
}

/// Curly quotes are configured as a single character and resolved to their pair.
fn paired_quote(mark: &str) -> Option<&'static str> {
    match mark {
        "\u{201C}" => Some("\u{201D}"),
        "\u{201D}" => Some("\u{201C}"),
        "\u{2018}" => Some("\u{2019}"),
        "\u{2019}" => Some("\u{2018}"),
        _ => None,
    }
}

/// Toggle scan for an identical open/close marker.
///
/// Every even-numbered occurrence closes a span; text after an unpaired
/// trailing marker is dropped.
fn between_same_marker<'a>(text: &'a str, marker: &str) -> Vec<&'a str> {
    let pieces: Vec<&str> = text.split(marker).collect();
    let last = pieces.len().saturating_sub(1);

    pieces
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 1 && *i < last)
        .map(|(_, piece)| piece.trim())
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn between_markers<'a>(text: &'a str, start: &str, end: &str) -> Vec<&'a str> {
    let pattern = format!("{}(.*?){}", regex::escape(start), regex::escape(end));
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Remove every complete ```…``` fence; an unterminated fence is left alone.
fn strip_fenced_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let Some(close) = after_open.find("```") else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &after_open[close + 3..];
    }

    out.push_str(rest);
    out
}

/// Blank out markdown block-quote lines, keeping line structure intact.
fn strip_quote_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with('>') {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_yields_none() {
        let result = extract("   \n\t ", &ExtractionConfig::full());
        assert_eq!(result.mode, ResultMode::None);
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_full_mode_returns_original_text() {
        let raw = "  Hello *there*\n\nsecond line  ";
        let result = extract(raw, &ExtractionConfig::full());
        assert_eq!(result.mode, ResultMode::Full);
        assert_eq!(result.text, raw);
    }

    #[test]
    fn test_marked_with_parentheses() {
        let cfg = ExtractionConfig::marked("(", ")");
        let result = extract("a(hello)b(world)c", &cfg);
        assert_eq!(result.mode, ResultMode::Marked);
        assert_eq!(result.text, "hello world");
    }

    #[test]
    fn test_marked_same_marker_drops_unpaired_tail() {
        let cfg = ExtractionConfig::marked("\"", "\"");
        let result = extract("public \"one\" mid \"two\" tail \"dangling", &cfg);
        assert_eq!(result.text, "one two");
    }

    #[test]
    fn test_marked_same_marker_even_count() {
        let cfg = ExtractionConfig::marked("*", "*");
        let result = extract("*a* and *b*", &cfg);
        assert_eq!(result.text, "a b");
    }

    #[test]
    fn test_marked_curly_quote_resolves_pair() {
        let cfg = ExtractionConfig::marked("\u{201C}", "\u{201C}");
        let result = extract("He said \u{201C}hi\u{201D} then \u{201C}bye\u{201D}.", &cfg);
        assert_eq!(result.mode, ResultMode::Marked);
        assert_eq!(result.text, "hi bye");
    }

    #[test]
    fn test_marked_missing_marks_uses_fallback() {
        let cfg = ExtractionConfig::marked("", ")");
        assert_eq!(extract("text", &cfg).mode, ResultMode::Full);

        let cfg = ExtractionConfig::marked("(", "  ").with_fallback(Fallback::Empty);
        assert_eq!(extract("text", &cfg).mode, ResultMode::None);
    }

    #[test]
    fn test_marked_no_hits_falls_back() {
        let cfg = ExtractionConfig::marked("[", "]").with_fallback(Fallback::Empty);
        let result = extract("nothing marked here", &cfg);
        assert_eq!(result.mode, ResultMode::None);

        let cfg = ExtractionConfig::marked("[", "]");
        let result = extract("nothing marked here", &cfg);
        assert_eq!(result.mode, ResultMode::Full);
        assert_eq!(result.text, "nothing marked here");
    }

    #[test]
    fn test_marked_escapes_regex_metacharacters() {
        let cfg = ExtractionConfig::marked("$(", ")$");
        let result = extract("x $(first)$ y $( second )$", &cfg);
        assert_eq!(result.text, "first second");
    }

    #[test]
    fn test_marked_skips_empty_spans() {
        let cfg = ExtractionConfig::marked("(", ")");
        let result = extract("() ( ) (kept)", &cfg);
        assert_eq!(result.text, "kept");
    }

    #[test]
    fn test_inherit_behaves_like_marked() {
        let cfg = ExtractionConfig {
            mode: ExtractMode::Inherit,
            start: "\u{FF08}".to_string(),
            end: "\u{FF09}".to_string(),
            ..ExtractionConfig::default()
        };
        let result = extract("\u{FF08}spoken\u{FF09} narration", &cfg);
        assert_eq!(result.mode, ResultMode::Marked);
        assert_eq!(result.text, "spoken");
    }

    #[test]
    fn test_regex_prefers_group_one() {
        let cfg = ExtractionConfig::regex(r"\[(.*?)\]");
        let result = extract("a[x]b[y]c", &cfg);
        assert_eq!(result.mode, ResultMode::Regex);
        assert_eq!(result.text, "x y");
    }

    #[test]
    fn test_regex_without_group_uses_whole_match() {
        let cfg = ExtractionConfig::regex(r"\d+");
        let result = extract("a 12 b 7", &cfg);
        assert_eq!(result.text, "12 7");
    }

    #[test]
    fn test_regex_invalid_pattern_falls_back() {
        let cfg = ExtractionConfig::regex("(unclosed").with_fallback(Fallback::Empty);
        let result = extract("some text", &cfg);
        assert_eq!(result.mode, ResultMode::None);

        let cfg = ExtractionConfig::regex("(unclosed");
        let result = extract("some text", &cfg);
        assert_eq!(result.mode, ResultMode::Full);
    }

    #[test]
    fn test_regex_unset_falls_back() {
        let cfg = ExtractionConfig::regex("   ");
        assert_eq!(extract("abc", &cfg).mode, ResultMode::Full);
    }

    #[test]
    fn test_smart_strips_quotes_and_code() {
        let raw = "Intro line\n> quoted reply\n```rust\nfn main() {}\n```\nOutro";
        let cfg = ExtractionConfig {
            mode: ExtractMode::Smart,
            skip_code_blocks: true,
            ..ExtractionConfig::default()
        };
        let result = extract(raw, &cfg);
        assert_eq!(result.mode, ResultMode::Smart);
        assert!(result.text.contains("Intro line"));
        assert!(result.text.contains("Outro"));
        assert!(!result.text.contains("quoted"));
        assert!(!result.text.contains("fn main"));
    }

    #[test]
    fn test_smart_keeps_code_when_not_skipping() {
        let raw = "```\ncode\n```";
        let cfg = ExtractionConfig {
            mode: ExtractMode::Smart,
            ..ExtractionConfig::default()
        };
        let result = extract(raw, &cfg);
        assert_eq!(result.mode, ResultMode::Smart);
        assert!(result.text.contains("code"));
    }

    #[test]
    fn test_smart_empty_remainder_uses_fallback() {
        let raw = "> only a quote";
        let cfg = ExtractionConfig {
            mode: ExtractMode::Smart,
            fallback: Fallback::Empty,
            ..ExtractionConfig::default()
        };
        assert_eq!(extract(raw, &cfg).mode, ResultMode::None);

        let cfg = ExtractionConfig {
            mode: ExtractMode::Smart,
            ..ExtractionConfig::default()
        };
        let result = extract(raw, &cfg);
        assert_eq!(result.mode, ResultMode::Full);
        assert_eq!(result.text, raw);
    }

    #[test]
    fn test_unterminated_fence_is_kept() {
        assert_eq!(strip_fenced_code("a ``` b"), "a ``` b");
        assert_eq!(strip_fenced_code("a ```x``` b ```y``` c"), "a  b  c");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("SMART".parse::<ExtractMode>(), Ok(ExtractMode::Smart));
        assert!("loud".parse::<ExtractMode>().is_err());
        assert_eq!("empty".parse::<Fallback>(), Ok(Fallback::Empty));
    }
}
