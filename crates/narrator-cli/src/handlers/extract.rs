//! `narrator extract`: preview the paragraph queue of a message.

use anyhow::Result;
use narrator_core::{ExtractMode, ExtractionConfig, extract, split_paragraphs};

use crate::bootstrap::{CliContext, persona_key};
use crate::commands::TextSource;
use crate::input::read_text;

pub fn execute(ctx: &CliContext, source: &TextSource, persona: Option<&str>) -> Result<()> {
    let raw = read_text(source)?;
    let config = ctx.load()?;
    let key = persona_key(persona);
    let params = config.playback_params(&key);

    println!("Persona: {key}");
    println!("Rule:    {}", describe(&params.extract));
    print_queue(&raw, &params.extract);
    Ok(())
}

fn print_queue(raw: &str, cfg: &ExtractionConfig) {
    let result = extract(raw, cfg);
    println!("Matched: {}", result.mode);
    println!();

    let paragraphs = split_paragraphs(&result.text);
    if paragraphs.is_empty() {
        println!("Nothing to read.");
        return;
    }
    for (index, paragraph) in paragraphs.iter().enumerate() {
        println!("{index:>3}. {paragraph}");
    }
}

fn describe(cfg: &ExtractionConfig) -> String {
    let detail = match cfg.mode {
        ExtractMode::Marked | ExtractMode::Inherit => format!(" {} … {}", cfg.start, cfg.end),
        ExtractMode::Regex => format!(" /{}/", cfg.regex),
        ExtractMode::Smart if cfg.skip_code_blocks => " (skipping code blocks)".to_string(),
        ExtractMode::Smart | ExtractMode::Full => String::new(),
    };
    format!("{}{detail}, fallback {}", cfg.mode, cfg.fallback)
}
