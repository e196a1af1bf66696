//! `narrator update`: GitHub commit check and host-side extension update.

use anyhow::Result;
use chrono::Utc;
use narrator_provider::{UpdateChecker, UpdateOutcome, short_sha};

use crate::bootstrap::CliContext;
use crate::commands::UpdateCommand;
use crate::error::CliError;

const USER_AGENT: &str = concat!("narrator/", env!("CARGO_PKG_VERSION"));

pub async fn execute(ctx: &CliContext, command: UpdateCommand) -> Result<()> {
    // GitHub rejects requests without a user agent.
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CliError::Service(e.to_string()))?;

    let mut config = ctx.load_for_update()?;
    let checker = UpdateChecker::from_settings(&http, &config.settings);

    let force = match command {
        UpdateCommand::Check { force } => force,
        UpdateCommand::Apply => true,
    };
    let outcome = checker
        .check(&mut config.settings, force, Utc::now())
        .await
        .map_err(CliError::from)?;
    ctx.save(&config)?;

    match (&command, outcome) {
        (_, UpdateOutcome::NoRepository) => {
            return Err(CliError::Config(
                "no GitHub repository configured; run 'narrator config set githubRepo owner/repo'"
                    .to_string(),
            )
            .into());
        }
        (_, UpdateOutcome::Skipped) => {
            println!(
                "Not due yet (checking every {}h). Use --force to check now.",
                config.settings.update_check_interval_hours
            );
        }
        (_, UpdateOutcome::Initialized { remote }) => {
            println!("Recorded {} as the installed version.", short_sha(&remote));
        }
        (_, UpdateOutcome::UpToDate { remote }) => {
            println!("✓ Up to date ({}).", short_sha(&remote));
        }
        (UpdateCommand::Check { .. }, UpdateOutcome::UpdateAvailable { local, remote }) => {
            println!(
                "Update available: {} → {}. Run 'narrator update apply'.",
                short_sha(&local),
                short_sha(&remote)
            );
        }
        (UpdateCommand::Apply, UpdateOutcome::UpdateAvailable { local, remote }) => {
            println!("Updating {} → {} ...", short_sha(&local), short_sha(&remote));
            checker
                .perform_update(&mut config.settings, &remote)
                .await
                .map_err(CliError::from)?;
            ctx.save(&config)?;
            println!("✓ Updated. Reload the host application to use the new version.");
        }
    }
    Ok(())
}
