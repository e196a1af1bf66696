//! `narrator voices`: list, clone and delete backend voices.

use std::fs;
use std::path::Path;

use anyhow::Result;
use narrator_core::CustomVoice;
use narrator_provider::{VoiceUpload, preset_voices, validate_voice_name};

use crate::bootstrap::CliContext;
use crate::commands::VoicesCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: VoicesCommand) -> Result<()> {
    match command {
        VoicesCommand::List => list(ctx).await,
        VoicesCommand::Presets => {
            print_voices(&preset_voices());
            Ok(())
        }
        VoicesCommand::Upload { name, text, file } => upload(ctx, name, text, &file).await,
        VoicesCommand::Delete { uri } => delete(ctx, &uri).await,
    }
}

/// Fetch the backend's custom voices and remember them in the settings.
async fn list(ctx: &CliContext) -> Result<()> {
    let settings = ctx.load()?.settings;
    let client = ctx.tts_client(&settings)?;
    let voices = client
        .list_custom_voices()
        .await
        .map_err(CliError::from)?;

    let mut config = ctx.load_for_update()?;
    config.settings.custom_voices.clone_from(&voices);
    ctx.save(&config)?;

    if voices.is_empty() {
        println!("No custom voices. Use 'narrator voices upload' to clone one.");
    } else {
        print_voices(&voices);
    }
    Ok(())
}

async fn upload(ctx: &CliContext, name: String, text: String, file: &Path) -> Result<()> {
    validate_voice_name(&name).map_err(CliError::from)?;
    let mime = mime_for(file).ok_or_else(|| {
        CliError::Arguments(format!(
            "unsupported audio file '{}': use mp3, wav, ogg, m4a or flac",
            file.display()
        ))
    })?;
    let audio = fs::read(file).map_err(|e| CliError::Io(format!("{}: {e}", file.display())))?;
    let file_name = file
        .file_name()
        .map_or_else(|| "voice".to_string(), |n| n.to_string_lossy().into_owned());

    let settings = ctx.load()?.settings;
    let client = ctx.tts_client(&settings)?;
    let upload = VoiceUpload {
        name,
        text,
        audio,
        mime: mime.to_string(),
        file_name,
    };
    client.upload_voice(&upload).await.map_err(CliError::from)?;

    println!("✓ Uploaded voice '{}'.", upload.name);
    println!("Run 'narrator voices list' to see its uri.");
    Ok(())
}

async fn delete(ctx: &CliContext, uri: &str) -> Result<()> {
    let settings = ctx.load()?.settings;
    let client = ctx.tts_client(&settings)?;
    client.delete_voice(uri).await.map_err(CliError::from)?;

    let mut config = ctx.load_for_update()?;
    if config.settings.remove_custom_voice(uri) {
        ctx.save(&config)?;
    }
    println!("✓ Deleted voice {uri}");
    Ok(())
}

fn print_voices(voices: &[CustomVoice]) {
    let width = voices.iter().map(|v| v.name.chars().count()).max().unwrap_or(0);
    for voice in voices {
        println!("{:<width$}  {}", voice.name, voice.uri);
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "opus" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}
