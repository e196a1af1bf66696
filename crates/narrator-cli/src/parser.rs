//! Root CLI parser and global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Read chat messages aloud paragraph by paragraph.
#[derive(Parser)]
#[command(name = "narrator")]
#[command(about = "Read chat messages aloud with a remote TTS backend")]
#[command(version)]
pub struct Cli {
    /// Directory holding settings.json
    #[arg(long = "data-dir", env = "NARRATOR_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// API key for this invocation, overriding the stored one
    #[arg(long = "api-key", env = "NARRATOR_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{UpdateCommand, VoicesCommand};
    use crate::config_commands::{ConfigCommand, PersonaCommand};
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "narrator",
            "--verbose",
            "--data-dir",
            "/tmp/narrator",
            "test-connection",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/narrator")));
        assert!(matches!(cli.command, Some(Commands::TestConnection)));
    }

    #[test]
    fn test_speak_args() {
        let cli = Cli::parse_from([
            "narrator", "speak", "42", "--text", "Hello", "--from", "2", "--persona", "chat:7",
        ]);
        let Some(Commands::Speak(args)) = cli.command else {
            panic!("expected speak");
        };
        assert_eq!(args.message_id, "42");
        assert_eq!(args.source.text.as_deref(), Some("Hello"));
        assert_eq!(args.from, Some(2));
        assert_eq!(args.persona.as_deref(), Some("chat:7"));
    }

    #[test]
    fn test_text_and_file_conflict() {
        let result = Cli::try_parse_from([
            "narrator", "extract", "--text", "a", "--file", "b.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_voices_upload_args() {
        let cli = Cli::parse_from([
            "narrator", "voices", "upload", "--name", "narrator-one", "--text", "hi", "--file",
            "sample.wav",
        ]);
        let Some(Commands::Voices {
            command: VoicesCommand::Upload { name, file, .. },
        }) = cli.command
        else {
            panic!("expected voices upload");
        };
        assert_eq!(name, "narrator-one");
        assert_eq!(file, PathBuf::from("sample.wav"));
    }

    #[test]
    fn test_config_persona_set_args() {
        let cli = Cli::parse_from([
            "narrator", "config", "persona", "set", "persona:alice", "--mode", "regex", "--regex",
            r"\[(.*?)\]", "--fallback", "empty",
        ]);
        let Some(Commands::Config {
            command: ConfigCommand::Persona {
                command: PersonaCommand::Set { key, patch },
            },
        }) = cli.command
        else {
            panic!("expected persona set");
        };
        assert_eq!(key, "persona:alice");
        assert_eq!(patch.mode.as_deref(), Some("regex"));
        assert_eq!(patch.fallback.as_deref(), Some("empty"));
    }

    #[test]
    fn test_update_check_force() {
        let cli = Cli::parse_from(["narrator", "update", "check", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Update {
                command: UpdateCommand::Check { force: true }
            })
        ));
    }
}
