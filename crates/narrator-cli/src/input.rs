//! Reading message text and interactive playback commands.

use std::fs;

use crate::commands::TextSource;
use crate::error::CliError;

/// Resolve `--file` / `--text` into the raw message text.
pub fn read_text(source: &TextSource) -> Result<String, CliError> {
    match (&source.text, &source.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display()))),
        (None, None) => Err(CliError::Arguments(
            "provide the message with --text or --file".to_string(),
        )),
    }
}

/// One line typed while `speak` is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakCommand {
    /// Pause or resume, like clicking the message's button.
    Primary,
    Restart,
    FromParagraph(usize),
    Stop,
    Quit,
}

impl SpeakCommand {
    pub const HELP: &'static str =
        "Commands: p = pause/resume, r = restart, f N = from paragraph N, s = stop, q = quit";

    /// Parse a line; `None` for blank or unknown input.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "p" | "pause" | "resume" => Self::Primary,
            "r" | "restart" => Self::Restart,
            "f" | "from" => Self::FromParagraph(words.next()?.parse().ok()?),
            "s" | "stop" => Self::Stop,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}
