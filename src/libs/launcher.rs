//! # Launcher Extender
//!
//! The OSGeo4W installer writes `OSGeo4W.bat`, which prepares a shell by calling
//! `bin\o4w_env.bat`. Optional components (Python 3, Qt5, the PyCharm locator) ship
//! their own `bin\<name>.bat` fragments that are not called by default.
//!
//! This module writes a derived launcher, `OSGeo4W<suffix>.bat`, that is the base
//! launcher with one `call` line per extra fragment spliced in right after the
//! `o4w_env` call. The base file is never modified, and the output only depends on
//! the base content and the fragment list, so re-running rewrites the same bytes.

use crate::errors::{InstallerError, Result};
use crate::libs::utilities::file_operations::write_atomically;
use crate::schemas::config::BASE_FRAGMENT;
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the launcher produced by the vendor installer.
pub const BASE_LAUNCHER: &str = "OSGeo4W.bat";

/// The line that calls fragment `name`, resolved relative to the launcher's own
/// directory (`%~dp0`).
pub fn fragment_call(name: &str) -> String {
    format!(r#"call "%~dp0\bin\{name}.bat""#)
}

/// `OSGeo4W<suffix>.bat`
pub fn derived_launcher_name(suffix: &str) -> String {
    format!("OSGeo4W{suffix}.bat")
}

/// What `extend_launcher` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedLauncher {
    pub path: PathBuf,
    /// Number of `call` lines spliced in. Zero means the anchor was missing and the
    /// derived launcher is a plain copy of the base one.
    pub inserted: usize,
}

/// Splices one `call` line per fragment after every anchor line of `base`.
///
/// Works on raw bytes: batch files are commonly saved in the ANSI codepage, so only
/// the anchor line has to be ASCII. Line terminators of the base are preserved and
/// inserted lines reuse the anchor's terminator.
///
/// # Arguments
/// * `base` - Content of `OSGeo4W.bat`.
/// * `fragments` - Fragment names, called in the given order.
///
/// # Returns
/// The new content and the number of inserted lines.
pub fn render_extended_launcher(base: &[u8], fragments: &[String]) -> (Vec<u8>, usize) {
    let anchor = fragment_call(BASE_FRAGMENT);
    let mut out = Vec::with_capacity(base.len() + fragments.len() * 40);
    let mut inserted = 0;

    for line in base.split_inclusive(|&b| b == b'\n') {
        out.extend_from_slice(line);
        if line.trim_ascii_end() != anchor.as_bytes() {
            continue;
        }
        let eol: &[u8] = if line.ends_with(b"\r\n") {
            b"\r\n"
        } else if line.ends_with(b"\n") {
            b"\n"
        } else {
            // anchor is the last line and has no terminator
            out.push(b'\n');
            b"\n"
        };
        for fragment in fragments {
            out.extend_from_slice(fragment_call(fragment).as_bytes());
            out.extend_from_slice(eol);
            inserted += 1;
        }
    }
    (out, inserted)
}

/// Writes `<install_root>/OSGeo4W<suffix>.bat` from `base_launcher` and `fragments`.
///
/// A base launcher without the anchor line is not an error: the derived file becomes
/// a verbatim copy and `inserted` is zero, which callers should check.
///
/// # Arguments
/// * `base_launcher`: The vendor's `OSGeo4W.bat`. Read only, never modified.
/// * `install_root`: Directory the derived launcher is written to.
/// * `fragments`: Fragment names to call after `o4w_env`, in order.
/// * `suffix`: Appended to `OSGeo4W` to name the derived launcher. Must not be empty.
///
/// # Returns
/// The derived launcher's path and the number of inserted `call` lines, or
/// `InstallerError::InvalidConfig` if the derived path would be the base launcher.
pub fn extend_launcher(
    base_launcher: &Path,
    install_root: &Path,
    fragments: &[String],
    suffix: &str,
) -> Result<ExtendedLauncher> {
    let derived = install_root.join(derived_launcher_name(suffix));
    if derived == base_launcher {
        return Err(InstallerError::InvalidConfig(format!(
            "derived launcher would overwrite the base launcher {}",
            base_launcher.display()
        )));
    }

    log_debug!(
        "[O4W::Launcher] Extending {} with fragments {:?}",
        base_launcher.display(),
        fragments
    );
    let base = fs::read(base_launcher).map_err(InstallerError::io(base_launcher))?;
    let (content, inserted) = render_extended_launcher(&base, fragments);

    if inserted == 0 && !fragments.is_empty() {
        log_warn!(
            "[O4W::Launcher] Anchor line '{}' not found in {}; {} is a plain copy",
            fragment_call(BASE_FRAGMENT).yellow(),
            base_launcher.display(),
            derived.display()
        );
    }

    write_atomically(&derived, &content)?;
    log_info!(
        "[O4W::Launcher] Wrote {} ({} fragment call(s))",
        derived.display().to_string().cyan(),
        inserted
    );
    Ok(ExtendedLauncher {
        path: derived,
        inserted,
    })
}
