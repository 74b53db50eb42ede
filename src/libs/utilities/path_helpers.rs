// Path resolution helpers shared by config loading and the commands.

use crate::errors::{InstallerError, Result};
use crate::log_debug;
use colored::Colorize;
use std::path::PathBuf;

/// Directory holding the default config, `~/.osgeo4w-installer`.
const APP_DIR: &str = ".osgeo4w-installer";
const CONFIG_FILE: &str = "config.yaml";

/// Expands a leading `~` and `$VAR` / `${VAR}` references in a configured path.
///
/// Windows-style `%VAR%` references are left untouched; they only mean something
/// to `cmd.exe`.
pub fn expand_path(raw: &str) -> Result<String> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| InstallerError::InvalidConfig(format!("cannot expand '{raw}': {e}")))?;
    if expanded != raw {
        log_debug!("[O4W::Paths] Expanded '{}' to '{}'", raw, expanded.cyan());
    }
    Ok(expanded.into_owned())
}

/// `~/.osgeo4w-installer/config.yaml`, or `None` if there is no home directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR).join(CONFIG_FILE))
}
