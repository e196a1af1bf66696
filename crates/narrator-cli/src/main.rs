//! CLI entry point: the composition root.
//!
//! Parses arguments, builds the [`CliContext`](narrator_cli::CliContext) and
//! dispatches to a handler. Errors are printed once here and mapped to an
//! exit code.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use narrator_cli::bootstrap::load_env;
use narrator_cli::error::exit_code_for;
use narrator_cli::{Cli, Commands, bootstrap, handlers, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing, so .env values feed `env = ...` arguments
    load_env();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = exit_code_for(&e);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(&cli)?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Speak(args) => handlers::speak::execute(&ctx, args).await?,
        Commands::Extract { source, persona } => {
            handlers::extract::execute(&ctx, &source, persona.as_deref())?;
        }
        Commands::Voices { command } => handlers::voices::execute(&ctx, command).await?,
        Commands::TestConnection => handlers::connection::execute(&ctx).await?,
        Commands::Config { command } => handlers::config::execute(&ctx, command)?,
        Commands::Update { command } => handlers::update::execute(&ctx, command).await?,
    }

    Ok(())
}
