//! Top-level commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config_commands::ConfigCommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Play a message and control playback from stdin
    Speak(SpeakArgs),

    /// Show what would be read for a message, paragraph by paragraph
    Extract {
        #[command(flatten)]
        source: TextSource,
        /// Persona whose extraction rules apply (default: global)
        #[arg(long)]
        persona: Option<String>,
    },

    /// Manage voices on the TTS backend
    Voices {
        #[command(subcommand)]
        command: VoicesCommand,
    },

    /// Check that the API URL and key are accepted
    TestConnection,

    /// View or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Check for and install extension updates
    Update {
        #[command(subcommand)]
        command: UpdateCommand,
    },
}

/// Where the message text comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TextSource {
    /// Read the message from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Message text given inline
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SpeakArgs {
    /// Numeric message id
    pub message_id: String,
    #[command(flatten)]
    pub source: TextSource,
    /// Start at this paragraph (0-based, clamped to the last one)
    #[arg(long)]
    pub from: Option<usize>,
    /// Persona whose extraction rules apply (default: global)
    #[arg(long)]
    pub persona: Option<String>,
}

#[derive(Subcommand)]
pub enum VoicesCommand {
    /// List custom voices stored on the backend
    List,
    /// List the built-in voices of the default model
    Presets,
    /// Clone a voice from a reference recording
    Upload {
        /// Voice name (letters, digits, `_` and `-`, at most 64 characters)
        #[arg(long)]
        name: String,
        /// Transcript of the recording
        #[arg(long)]
        text: String,
        /// Audio file (mp3, wav, ogg, m4a, flac)
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a custom voice by uri
    Delete { uri: String },
}

#[derive(Subcommand)]
pub enum UpdateCommand {
    /// Compare the installed commit with the repository
    Check {
        /// Check even if the automatic interval has not elapsed
        #[arg(long)]
        force: bool,
    },
    /// Install the latest commit through the host application
    Apply,
}
