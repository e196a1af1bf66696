//! Configuration subcommands.

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all settings and where they are stored
    Show {
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Store the API key
    SetKey { key: String },
    /// Set one setting by its camelCase name (e.g. ttsVoice, ttsSpeed)
    Set { field: String, value: String },
    /// Per-persona extraction rules
    Persona {
        #[command(subcommand)]
        command: PersonaCommand,
    },
}

#[derive(Subcommand)]
pub enum PersonaCommand {
    /// Show stored and effective rules for a persona
    Show {
        /// Persona key (default: global)
        key: Option<String>,
    },
    /// Merge new values into a persona's rules
    Set {
        key: String,
        #[command(flatten)]
        patch: PersonaPatchArgs,
    },
    /// Forget a persona's rules
    Reset { key: String },
}

/// Values left out keep their stored setting.
#[derive(Args, Debug, Clone, Default)]
pub struct PersonaPatchArgs {
    /// full, marked, regex, smart or inherit
    #[arg(long)]
    pub mode: Option<String>,
    /// Start mark for marked mode
    #[arg(long)]
    pub start: Option<String>,
    /// End mark for marked mode
    #[arg(long)]
    pub end: Option<String>,
    /// Pattern for regex mode (capture group 1 is read when present)
    #[arg(long)]
    pub regex: Option<String>,
    /// full or empty
    #[arg(long)]
    pub fallback: Option<String>,
    /// Drop fenced code blocks in smart mode
    #[arg(long)]
    pub skip_code_blocks: Option<bool>,
}
