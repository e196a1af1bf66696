//! `narrator test-connection`.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let settings = ctx.load()?.settings;
    let client = ctx.tts_client(&settings)?;

    println!("Testing {} ...", settings.api_url);
    client.test_connection().await.map_err(CliError::from)?;
    println!("✓ Connection OK (model {})", client.model());
    Ok(())
}
