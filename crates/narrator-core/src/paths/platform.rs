//! Data root resolution.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "NARRATOR_DATA_DIR";

const APP_DIR: &str = "narrator";
const SETTINGS_FILE: &str = "settings.json";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `NARRATOR_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/narrator`)
///
/// # Errors
///
/// Returns [`PathError::NoDataDir`] when neither source is available.
pub fn data_root() -> Result<PathBuf, PathError> {
    resolve(env::var(DATA_DIR_ENV).ok().as_deref(), dirs::data_dir())
}

/// [`data_root`], created if missing.
///
/// # Errors
///
/// Fails if the root cannot be resolved, exists as a file, or cannot be created.
pub fn ensure_data_root() -> Result<PathBuf, PathError> {
    let root = data_root()?;
    if root.exists() && !root.is_dir() {
        return Err(PathError::NotADirectory(root));
    }
    fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
        path: root.clone(),
        reason: e.to_string(),
    })?;
    Ok(root)
}

/// Path of the settings file inside the data root. Not created.
///
/// # Errors
///
/// Fails if the data root cannot be resolved.
pub fn settings_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SETTINGS_FILE))
}

fn resolve(override_dir: Option<&str>, system_dir: Option<PathBuf>) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir.map(str::trim).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    system_dir
        .map(|dir| dir.join(APP_DIR))
        .ok_or(PathError::NoDataDir)
}
