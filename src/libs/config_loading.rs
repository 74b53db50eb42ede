// Loads the YAML config file, layers CLI overrides on top and resolves the plan.

use crate::cli::cmd_enums::PlanOverrides;
use crate::errors::{InstallerError, Result};
use crate::libs::utilities::path_helpers::{default_config_path, expand_path};
use crate::schemas::config::{InstallPlan, InstallerConfig};
use crate::{log_debug, log_info};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Parses one config file.
pub fn load_config_file(path: &Path) -> Result<InstallerConfig> {
    log_debug!("[O4W::Config] Loading config from {}", path.display());
    let contents = fs::read_to_string(path).map_err(|source| InstallerError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    // An empty file is a valid "all defaults" config.
    if contents.trim().is_empty() {
        return Ok(InstallerConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| InstallerError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Picks the config source: an explicit path must exist; otherwise the default
/// location is used if present, else built-in defaults.
pub fn load_config(explicit: Option<&str>) -> Result<(InstallerConfig, Option<PathBuf>)> {
    if let Some(raw) = explicit {
        let path = PathBuf::from(expand_path(raw)?);
        let config = load_config_file(&path)?;
        return Ok((config, Some(path)));
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            let config = load_config_file(&path)?;
            Ok((config, Some(path)))
        }
        _ => {
            log_debug!("[O4W::Config] No config file found, using built-in defaults");
            Ok((InstallerConfig::default(), None))
        }
    }
}

/// CLI flags win over file values. Boolean flags can only switch behaviour on.
pub fn apply_overrides(config: &mut InstallerConfig, overrides: &PlanOverrides) {
    if !overrides.architectures.is_empty() {
        config.architectures = Some(overrides.architectures.clone());
    }
    if let Some(value) = &overrides.root_base {
        config.root_base = Some(value.clone());
    }
    if let Some(value) = &overrides.root_suffix {
        config.root_suffix = Some(value.clone());
    }
    if let Some(value) = &overrides.setup_suffix {
        config.setup_suffix = Some(value.clone());
    }
    if let Some(value) = &overrides.base_url {
        config.base_url = Some(value.clone());
    }
    if let Some(value) = &overrides.patches_dir {
        config.patches_dir = Some(value.clone());
    }
    if let Some(value) = &overrides.python_home {
        config.python_home = Some(value.clone());
    }
    if overrides.offline {
        config.offline_mode = Some(true);
    }
    if overrides.interactive {
        config.quiet_mode = Some(false);
    }
    if overrides.dev {
        config.dev = Some(true);
    }
}

/// File + overrides + defaults, resolved against `today`.
pub fn resolve_plan_on(overrides: &PlanOverrides, today: NaiveDate) -> Result<InstallPlan> {
    let (mut config, source) = load_config(overrides.config.as_deref())?;
    if let Some(path) = &source {
        log_info!("[O4W::Config] Using config file: {}", path.display().to_string().cyan());
    }
    apply_overrides(&mut config, overrides);
    let plan = InstallPlan::resolve(config, today)?;
    match serde_json::to_string_pretty(&plan) {
        Ok(json) => log_debug!("[O4W::Config] Resolved plan:\n{}", json),
        Err(e) => log_debug!("[O4W::Config] Resolved plan (raw): {:?} ({})", plan, e),
    }
    Ok(plan)
}

/// `resolve_plan_on` with the local date.
pub fn resolve_plan(overrides: &PlanOverrides) -> Result<InstallPlan> {
    resolve_plan_on(overrides, Local::now().date_naive())
}
