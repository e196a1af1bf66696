//! JSON file persistence for settings and persona extraction overrides.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{PersonaKey, PlaybackParams};
use crate::paths::{PathError, ensure_data_root, settings_path};
use crate::settings::{
    ExtractSettingsPatch, PersonaExtractSettings, Settings, SettingsError, validate_settings,
};

/// Errors from reading or writing the settings file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] SettingsError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Everything stored in the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    pub settings: Settings,
    pub personas: BTreeMap<PersonaKey, PersonaExtractSettings>,
}

impl StoredConfig {
    /// Stored overrides for a persona, or empty ones.
    #[must_use]
    pub fn persona(&self, key: &PersonaKey) -> PersonaExtractSettings {
        self.personas.get(key).cloned().unwrap_or_default()
    }

    /// Snapshot the parameters for a queue built under `key`.
    #[must_use]
    pub fn playback_params(&self, key: &PersonaKey) -> PlaybackParams {
        self.settings.playback_params(key.clone(), &self.persona(key))
    }
}

/// Reads and writes [`StoredConfig`] at a fixed path.
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the data root.
    ///
    /// # Errors
    ///
    /// Fails if the data root cannot be resolved or created.
    pub fn open_default() -> Result<Self, StoreError> {
        ensure_data_root()?;
        Ok(Self::new(settings_path()?))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored config. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors other than "not found" and on malformed JSON.
    pub fn load(&self) -> Result<StoredConfig, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                Ok(StoredConfig::default())
            }
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Persist the config atomically.
    ///
    /// # Errors
    ///
    /// Fails if the parent directory cannot be created or the file cannot be
    /// written or renamed.
    pub fn save(&self, config: &StoredConfig) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    /// Load, modify and save the global settings. Validation runs before
    /// anything is written.
    ///
    /// # Errors
    ///
    /// Fails if `apply` fails, validation fails, or the file cannot be
    /// read or written.
    pub fn update_settings<F>(&self, apply: F) -> Result<Settings, StoreError>
    where
        F: FnOnce(&mut Settings) -> Result<(), SettingsError>,
    {
        let mut config = self.load()?;
        apply(&mut config.settings)?;
        validate_settings(&config.settings)?;
        self.save(&config)?;
        Ok(config.settings)
    }

    /// Merge a patch into a persona's overrides and persist the result.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or written.
    pub fn save_persona_patch(
        &self,
        key: &PersonaKey,
        patch: &ExtractSettingsPatch,
    ) -> Result<PersonaExtractSettings, StoreError> {
        let mut config = self.load()?;
        let entry = config.personas.entry(key.clone()).or_default();
        entry.merge(patch);
        let merged = entry.clone();
        self.save(&config)?;
        Ok(merged)
    }

    /// Drop a persona's overrides. Returns whether any were stored.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or written.
    pub fn reset_persona(&self, key: &PersonaKey) -> Result<bool, StoreError> {
        let mut config = self.load()?;
        let removed = config.personas.remove(key).is_some();
        if removed {
            self.save(&config)?;
        }
        Ok(removed)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
