//! `narrator speak`: play one message and take playback commands from stdin.

use std::sync::Arc;

use anyhow::Result;
use narrator_core::{
    ButtonState, MessageId, PlaybackParams, ReporterEvent, SpeechSynthesizer,
};
use narrator_playback::{
    ChannelReporter, PlaybackController, PrimaryOutcome, RodioOutput, SegmentCache, StartOutcome,
};
use narrator_provider::ProviderError;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bootstrap::{CliContext, persona_key};
use crate::commands::SpeakArgs;
use crate::error::CliError;
use crate::input::{SpeakCommand, read_text};

/// Whether the interactive loop keeps running.
enum Flow {
    Continue,
    Exit,
}

struct Session {
    controller: PlaybackController,
    message_id: MessageId,
    raw: String,
    params: PlaybackParams,
}

pub async fn execute(ctx: &CliContext, args: SpeakArgs) -> Result<()> {
    let message_id = MessageId::parse(&args.message_id).ok_or_else(|| {
        CliError::Arguments(format!(
            "message id must be numeric, got '{}'",
            args.message_id
        ))
    })?;
    let raw = read_text(&args.source)?;

    let config = ctx.load()?;
    let params = config.playback_params(&persona_key(args.persona.as_deref()));
    let client = ctx.tts_client(&config.settings)?;
    if !client.has_api_key() {
        return Err(CliError::from(ProviderError::MissingApiKey).into());
    }
    let output = RodioOutput::new().map_err(CliError::from)?;

    let (reporter, mut events) = ChannelReporter::new();
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(client);
    let controller = PlaybackController::new(
        synthesizer,
        Arc::new(output),
        Arc::new(reporter),
        Arc::new(SegmentCache::new()),
    );
    let session = Session {
        controller,
        message_id,
        raw,
        params,
    };

    let started = match args.from {
        Some(index) => session.from_paragraph(index),
        None => session.primary(),
    };
    if !started {
        println!("Nothing to read in message {}.", session.message_id);
        return Ok(());
    }
    eprintln!("{}", SpeakCommand::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if let Flow::Exit = session.on_event(&event) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        if let Flow::Exit = session.on_line(&line) {
                            break;
                        }
                    }
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read stdin, ignoring further input");
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.controller.stop();
    Ok(())
}

impl Session {
    fn primary(&self) -> bool {
        let outcome = self.controller.handle_primary_action(
            self.message_id.as_str(),
            &self.raw,
            &self.params,
        );
        match outcome {
            PrimaryOutcome::Started { segments } => {
                println!("Reading message {} ({segments} paragraphs)", self.message_id);
                true
            }
            PrimaryOutcome::Paused | PrimaryOutcome::Resumed => true,
            PrimaryOutcome::NothingToRead | PrimaryOutcome::InvalidMessageId => false,
        }
    }

    fn from_paragraph(&self, index: usize) -> bool {
        match self
            .controller
            .play_from_paragraph(&self.message_id, &self.raw, &self.params, index)
        {
            StartOutcome::Started { segments, from } => {
                println!(
                    "Reading message {} from paragraph {from} of {segments}",
                    self.message_id
                );
                true
            }
            StartOutcome::NothingToRead => false,
        }
    }

    fn on_event(&self, event: &ReporterEvent) -> Flow {
        match event {
            ReporterEvent::State { message_id, state } => {
                match self.controller.status().index() {
                    Some(index) if *state != ButtonState::Idle => {
                        println!("[{message_id}] {} (paragraph {index})", state.label());
                    }
                    _ => println!("[{message_id}] {}", state.label()),
                }
            }
            ReporterEvent::Notice(notice) => println!("{notice}"),
        }

        // Idle with no active message means the queue ran out or was stopped.
        if self.controller.active_message().is_none() {
            Flow::Exit
        } else {
            Flow::Continue
        }
    }

    fn on_line(&self, line: &str) -> Flow {
        let Some(command) = SpeakCommand::parse(line) else {
            if !line.trim().is_empty() {
                eprintln!("{}", SpeakCommand::HELP);
            }
            return Flow::Continue;
        };

        match command {
            SpeakCommand::Primary => {
                self.primary();
            }
            SpeakCommand::Restart => {
                self.controller
                    .play_from_start(&self.message_id, &self.raw, &self.params);
            }
            SpeakCommand::FromParagraph(index) => {
                self.from_paragraph(index);
            }
            SpeakCommand::Stop | SpeakCommand::Quit => {
                self.controller.stop();
                return Flow::Exit;
            }
        }
        Flow::Continue
    }
}
