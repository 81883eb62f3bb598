pub mod settings;

pub use settings::Settings;

use std::path::PathBuf;

use crate::errors::{PassKeeperError, Result};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "PASSKEEPER_DATA_DIR";

/// Pick the data directory: an explicit path wins, otherwise the
/// platform data directory (e.g. `~/.local/share/passkeeper`).
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("passkeeper"))
        .ok_or_else(|| {
            PassKeeperError::ConfigError(format!(
                "cannot determine a data directory; pass --data-dir or set {DATA_DIR_ENV}"
            ))
        })
}
