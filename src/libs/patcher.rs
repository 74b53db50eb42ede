//! # Post-Install Patcher
//!
//! Two independent fix-ups applied to a finished OSGeo4W install:
//!
//! - **Library copy**: `bin/geos_c.dll` is also needed next to the interpreter's own
//!   libraries (`<python_home>/Library/lib`), where shapely looks for it.
//! - **File replace-with-backup**: `osgeo/gdal.py` is swapped for a patched copy
//!   shipped alongside the tool. The swap only happens when the installed file is
//!   byte-identical to the known original (`gdal.py.bak` next to the patch), and the
//!   installed original is kept once as `gdal.py.bak` in the install tree.
//!
//! Refusals are outcomes, not errors: the caller reports them and carries on with
//! the next step. Only filesystem failures are returned as `Err`.

use crate::errors::{InstallerError, Result};
use crate::libs::utilities::file_operations::{copy_no_clobber, ensure_dir, files_equal, write_atomically};
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const GEOS_LIBRARY: &str = "geos_c.dll";
pub const GDAL_MODULE: &str = "gdal.py";
/// Appended to a file name to name its backup / expected original.
pub const BACKUP_SUFFIX: &str = ".bak";

/// `<path>.bak`
pub fn with_backup_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryCopy {
    Copied,
    /// Destination already had the file; it was left untouched.
    AlreadyPresent,
    /// Some installs legitimately do not ship the library.
    SourceMissing,
}

/// Source and destination of the GEOS library for the install at `root`.
pub fn geos_library_paths(root: &Path, python_home: &Path) -> (PathBuf, PathBuf) {
    let source = root.join("bin").join(GEOS_LIBRARY);
    let destination = root.join(python_home).join("Library").join("lib").join(GEOS_LIBRARY);
    (source, destination)
}

/// Copies `source` to `destination` unless the destination already exists.
pub fn copy_library(source: &Path, destination: &Path) -> Result<LibraryCopy> {
    if !source.is_file() {
        log_warn!(
            "[O4W::Patcher] {} not found, nothing to copy",
            source.display().to_string().yellow()
        );
        return Ok(LibraryCopy::SourceMissing);
    }
    if destination.is_file() {
        log_debug!("[O4W::Patcher] {} already present", destination.display());
        return Ok(LibraryCopy::AlreadyPresent);
    }

    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }
    if !copy_no_clobber(source, destination)? {
        return Ok(LibraryCopy::AlreadyPresent);
    }
    if !destination.is_file() {
        return Err(InstallerError::io(destination)(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "copied library is missing",
        )));
    }
    log_info!(
        "[O4W::Patcher] Copied {} to {}",
        source.display(),
        destination.display().to_string().green()
    );
    Ok(LibraryCopy::Copied)
}

/// Result of `FilePatch::apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Destination now holds the patched content.
    Patched,
    /// Destination already held the patched content; nothing was touched.
    AlreadyPatched,
    SourceMissing,
    DestinationMissing,
    ExpectedOriginalMissing,
    /// Destination is neither the patch nor the known original.
    UnexpectedContent,
    /// A backup from an earlier run is in the way.
    BackupExists,
    /// Destination differs from the patch after writing it.
    VerificationFailed,
}

impl ReplaceOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, ReplaceOutcome::Patched | ReplaceOutcome::AlreadyPatched)
    }
}

impl fmt::Display for ReplaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            ReplaceOutcome::Patched => "patched",
            ReplaceOutcome::AlreadyPatched => "already patched",
            ReplaceOutcome::SourceMissing => "patch file not found",
            ReplaceOutcome::DestinationMissing => "installed file not found",
            ReplaceOutcome::ExpectedOriginalMissing => "expected original (.bak) not found",
            ReplaceOutcome::UnexpectedContent => "installed file differs from the expected original",
            ReplaceOutcome::BackupExists => "backup file already exists",
            ReplaceOutcome::VerificationFailed => "content differs after replacing",
        };
        f.write_str(text)
    }
}

/// A replace-with-backup of one installed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    /// Patched content to install.
    pub source: PathBuf,
    /// Known pristine content the destination must match before patching.
    pub expected_original: PathBuf,
    pub destination: PathBuf,
    /// Where the installed original is kept.
    pub backup: PathBuf,
}

impl FilePatch {
    /// Expected original and backup are `<source>.bak` and `<destination>.bak`.
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        FilePatch {
            expected_original: with_backup_suffix(&source),
            backup: with_backup_suffix(&destination),
            source,
            destination,
        }
    }

    /// The `osgeo/gdal.py` patch for the install at `root`.
    pub fn gdal(patches_dir: &Path, root: &Path, python_home: &Path) -> Self {
        FilePatch::new(
            patches_dir.join(GDAL_MODULE),
            root.join(python_home)
                .join("lib")
                .join("site-packages")
                .join("osgeo")
                .join(GDAL_MODULE),
        )
    }

    /// Replaces the destination with the source, keeping a backup of the original.
    ///
    /// Nothing is modified unless the destination matches the expected original and
    /// no backup exists yet. The original is copied to the backup first, then the
    /// patched bytes are renamed over the destination, so the destination path
    /// always exists.
    ///
    /// # Returns
    /// * `Ok(ReplaceOutcome::Patched)` after a verified swap.
    /// * `Ok` with one of the other outcomes when nothing was done (already patched,
    ///   unknown content, missing files, leftover backup) or the result did not verify.
    ///   Use [`ReplaceOutcome::is_success`] to classify them.
    /// * `Err` for I/O failures while reading, copying or renaming.
    pub fn apply(&self) -> Result<ReplaceOutcome> {
        if let Some(outcome) = self.check()? {
            return Ok(outcome);
        }

        // Step 1: keep the pristine original, refusing to overwrite an existing backup.
        if !copy_no_clobber(&self.destination, &self.backup)? {
            return Ok(ReplaceOutcome::BackupExists);
        }
        log_debug!(
            "[O4W::Patcher] Backed up {} to {}",
            self.destination.display(),
            self.backup.display()
        );

        // Step 2: swap the content in.
        let patched = fs::read(&self.source).map_err(InstallerError::io(&self.source))?;
        write_atomically(&self.destination, &patched)?;

        // Step 3: verify byte-for-byte.
        if files_equal(&self.source, &self.destination)? {
            log_info!(
                "[O4W::Patcher] Patched {}",
                self.destination.display().to_string().green()
            );
            Ok(ReplaceOutcome::Patched)
        } else {
            Ok(ReplaceOutcome::VerificationFailed)
        }
    }

    /// Preconditions. `Some` is a final outcome, `None` means the patch can go ahead.
    fn check(&self) -> Result<Option<ReplaceOutcome>> {
        if !self.source.is_file() {
            log_warn!("[O4W::Patcher] Patch file not found: {}", self.source.display());
            return Ok(Some(ReplaceOutcome::SourceMissing));
        }
        if !self.destination.is_file() {
            log_warn!("[O4W::Patcher] Installed file not found: {}", self.destination.display());
            return Ok(Some(ReplaceOutcome::DestinationMissing));
        }
        if files_equal(&self.source, &self.destination)? {
            log_debug!("[O4W::Patcher] {} is already patched", self.destination.display());
            return Ok(Some(ReplaceOutcome::AlreadyPatched));
        }
        if !self.expected_original.is_file() {
            log_warn!(
                "[O4W::Patcher] Expected original not found: {}",
                self.expected_original.display()
            );
            return Ok(Some(ReplaceOutcome::ExpectedOriginalMissing));
        }
        if !files_equal(&self.expected_original, &self.destination)? {
            log_warn!(
                "[O4W::Patcher] Cannot patch {}: its contents differ from {}",
                self.destination.display().to_string().yellow(),
                self.expected_original.display()
            );
            return Ok(Some(ReplaceOutcome::UnexpectedContent));
        }
        if self.backup.exists() {
            log_warn!(
                "[O4W::Patcher] Cannot patch {}: backup already exists at {}",
                self.destination.display().to_string().yellow(),
                self.backup.display()
            );
            return Ok(Some(ReplaceOutcome::BackupExists));
        }
        Ok(None)
    }
}
