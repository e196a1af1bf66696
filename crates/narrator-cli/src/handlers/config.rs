//! `narrator config`: settings and persona extraction rules.

use anyhow::Result;
use narrator_core::{ExtractMode, ExtractSettingsPatch, Fallback, PersonaExtractSettings, Settings};

use crate::bootstrap::{CliContext, persona_key};
use crate::config_commands::{ConfigCommand, PersonaCommand, PersonaPatchArgs};
use crate::error::CliError;

pub fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show { json } => show(ctx, json),
        ConfigCommand::SetKey { key } => {
            ctx.store
                .update_settings(|s| {
                    key.trim().clone_into(&mut s.api_key);
                    Ok(())
                })
                .map_err(CliError::from)?;
            println!("✓ API key saved.");
            Ok(())
        }
        ConfigCommand::Set { field, value } => {
            ctx.store
                .update_settings(|s| s.set_field(&field, &value))
                .map_err(CliError::from)?;
            println!("✓ {field} updated.");
            Ok(())
        }
        ConfigCommand::Persona { command } => persona(ctx, command),
    }
}

fn show(ctx: &CliContext, json: bool) -> Result<()> {
    let mut config = ctx.load()?;
    config.settings.api_key = config.settings.masked_api_key();

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Settings file: {}", ctx.store.path().display());
    println!();
    print_settings(&config.settings);

    if !config.personas.is_empty() {
        println!();
        println!("Personas with extraction rules:");
        for key in config.personas.keys() {
            println!("  {key}");
        }
    }
    Ok(())
}

fn print_settings(s: &Settings) {
    let or_none = |v: Option<&str>| v.unwrap_or("(none)").to_string();

    println!("API URL:          {}", s.api_url);
    println!("API key:          {}", s.api_key);
    println!("Model:            {}", s.tts_model);
    println!("Voice:            {}", s.tts_voice);
    println!("Speed / gain:     {} / {}", s.tts_speed, s.tts_gain);
    println!("Format:           {} @ {} Hz", s.response_format, s.sample_rate);
    println!("Marks:            {} … {}", s.text_start, s.text_end);
    println!("Auto play:        {}", s.auto_play);
    println!("Custom voices:    {}", s.custom_voices.len());
    println!();
    println!("Update repo:      {}", or_none(s.github_repo.as_deref()));
    println!("Branch / path:    {} / {}", s.github_branch, or_none(s.github_path.as_deref()));
    println!(
        "Auto check:       {} (every {}h)",
        s.auto_check_updates, s.update_check_interval_hours
    );
    println!("Installed commit: {}", or_none(s.last_installed_commit.as_deref()));
    println!("Host URL:         {}", s.host_url);
}

fn persona(ctx: &CliContext, command: PersonaCommand) -> Result<()> {
    match command {
        PersonaCommand::Show { key } => {
            let key = persona_key(key.as_deref());
            let config = ctx.load()?;
            let stored = config.persona(&key);
            let effective = config.settings.effective_extract_config(&stored);

            println!("Persona: {key}");
            if stored.is_empty() {
                println!("Stored:  (nothing, using defaults)");
            } else {
                println!("Stored:  {}", serde_json::to_string(&stored)?);
            }
            println!("Effective:");
            println!("  mode:             {}", effective.mode);
            println!("  marks:            {} … {}", effective.start, effective.end);
            println!("  regex:            {}", effective.regex);
            println!("  fallback:         {}", effective.fallback);
            println!("  skip code blocks: {}", effective.skip_code_blocks);
            Ok(())
        }
        PersonaCommand::Set { key, patch } => {
            let key = persona_key(Some(&key));
            let patch = build_patch(&patch)?;
            if patch.is_empty() {
                return Err(CliError::Arguments("nothing to change".to_string()).into());
            }
            let merged = ctx
                .store
                .save_persona_patch(&key, &patch)
                .map_err(CliError::from)?;
            println!("✓ Saved rules for {key}: {}", serde_json::to_string(&merged)?);
            Ok(())
        }
        PersonaCommand::Reset { key } => {
            let key = persona_key(Some(&key));
            if ctx.store.reset_persona(&key).map_err(CliError::from)? {
                println!("✓ Reset rules for {key}.");
            } else {
                println!("No rules stored for {key}.");
            }
            Ok(())
        }
    }
}

fn build_patch(args: &PersonaPatchArgs) -> Result<ExtractSettingsPatch, CliError> {
    let mode = args
        .mode
        .as_deref()
        .map(str::parse::<ExtractMode>)
        .transpose()
        .map_err(CliError::Arguments)?;
    let fallback = args
        .fallback
        .as_deref()
        .map(str::parse::<Fallback>)
        .transpose()
        .map_err(CliError::Arguments)?;

    Ok(PersonaExtractSettings {
        mode,
        start: args.start.clone(),
        end: args.end.clone(),
        regex: args.regex.clone(),
        fallback,
        skip_code_blocks: args.skip_code_blocks,
    })
}
