//! CLI bootstrap: environment, logging and the settings store.
//!
//! Everything the handlers need is reachable from [`CliContext`]. Network
//! clients and the audio device are created by the handlers that use them,
//! so commands like `extract` work without either.

use std::path::PathBuf;

use anyhow::Result;
use narrator_core::{PersonaKey, Settings, SettingsStore, StoredConfig};
use narrator_provider::{TtsClient, TtsClientConfig};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::parser::Cli;

/// Load `.env` from the working directory, if present. Must run before
/// argument parsing so `env = ...` defaults see the values.
pub fn load_env() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` and the
/// default is `warn`. Logs go to stderr so they never mix with command output.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Shared state for command handlers.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub store: SettingsStore,
    /// Key from `--api-key` / `NARRATOR_API_KEY`, never persisted.
    pub api_key_override: Option<String>,
}

impl CliContext {
    pub fn new(store: SettingsStore, api_key_override: Option<String>) -> Self {
        Self {
            store,
            api_key_override: api_key_override.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Stored configuration with the API key override applied.
    pub fn load(&self) -> Result<StoredConfig, CliError> {
        let mut config = self.store.load()?;
        self.apply_overrides(&mut config.settings);
        Ok(config)
    }

    /// Stored configuration exactly as on disk, for read-modify-write.
    pub fn load_for_update(&self) -> Result<StoredConfig, CliError> {
        Ok(self.store.load()?)
    }

    pub fn save(&self, config: &StoredConfig) -> Result<(), CliError> {
        Ok(self.store.save(config)?)
    }

    pub fn tts_client(&self, settings: &Settings) -> Result<TtsClient, CliError> {
        let config = TtsClientConfig::from_settings(settings);
        Ok(TtsClient::new(&config)?)
    }

    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(key) = &self.api_key_override {
            settings.api_key.clone_from(key);
        }
    }
}

/// Resolve a `--persona` argument.
pub fn persona_key(raw: Option<&str>) -> PersonaKey {
    raw.map_or_else(PersonaKey::global, PersonaKey::from_raw)
}

/// Build the handler context from parsed arguments.
pub fn bootstrap(cli: &Cli) -> Result<CliContext> {
    let store = match &cli.data_dir {
        Some(dir) => SettingsStore::new(settings_file_in(dir.clone())),
        None => SettingsStore::open_default().map_err(CliError::from)?,
    };
    tracing::debug!(path = %store.path().display(), "Using settings file");

    Ok(CliContext::new(store, cli.api_key.clone()))
}

fn settings_file_in(dir: PathBuf) -> PathBuf {
    dir.join("settings.json")
}
