//! Path utilities for narrator data directories.
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - OS-specific lookups are kept private in `platform`

mod error;
mod platform;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, ensure_data_root, settings_path};
