//! Paragraph splitting for the playback queue.
//!
//! Each resulting paragraph is synthesized and played as one segment, so the
//! splitter is deliberately fine-grained: blank lines separate blocks, and
//! every remaining line inside a block becomes its own paragraph.

/// Split speakable text into ordered, non-empty, single-line paragraphs.
///
/// Both `\n` and `\r\n` line endings are recognised. Whitespace runs inside a
/// paragraph collapse to one space. Applying the splitter to its own output
/// (joined by newlines) yields the same sequence.
#[must_use]
pub fn split_paragraphs(text: &str) -> Vec<String> {
    blocks(text)
        .into_iter()
        .flatten()
        .map(collapse_whitespace)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

/// Group lines into blocks separated by one or more blank lines.
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
