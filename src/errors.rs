// Error taxonomy for the installer.
//
// Only conditions that abort a run are errors. A non-zero exit from the vendor
// installer or pip, and the refusals of the patch steps, are reported as outcomes
// instead (see `schemas::report`).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    /// The vendor installer could not be fetched.
    #[error("failed to download '{url}': {reason}")]
    Download { url: String, reason: String },

    /// An external command could not even be started.
    #[error("failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Filesystem failure, tagged with the path being worked on.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The resolved configuration cannot produce a usable plan.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InstallerError {
    /// Helper for `map_err` on filesystem calls.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> InstallerError {
        let path = path.into();
        move |source| InstallerError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;
