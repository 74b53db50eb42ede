// Package Installer: runs `python -m pip install` inside the derived launcher.
//
// The launcher is the command itself, so the environment fragments it calls
// (py3_env, qt5_env, ...) are active when pip starts.

use crate::errors::Result;
// Same double-quoting as the installer command line.
use crate::installers::setup_exe::quoted;
// Seam for running the command, faked in tests.
use crate::libs::process_runner::ProcessRunner;
use crate::{log_debug, log_error, log_info, log_warn};
// For colored log output (`.cyan()`, `.red()`).
use colored::Colorize;
use std::path::Path;

/// Package manager command run through the launcher.
pub const PACKAGE_MANAGER: &str = "python -m pip";

/// `"<launcher>" python -m pip install <pkg> <pkg> ...`
pub fn pip_command_line(launcher: &Path, packages: &[String]) -> String {
    format!(
        "{} {} install {}",
        quoted(launcher),
        PACKAGE_MANAGER,
        packages.join(" ")
    )
}

/// Installs Python packages with pip, inside the environment an extended launcher sets up.
///
/// The command runs through the launcher (`"<root>\OSGeo4W3.bat" python -m pip install ...`)
/// so pip resolves to the interpreter of the OSGeo4W root, with every fragment the
/// launcher calls already applied. All packages go into one pip invocation.
///
/// # Arguments
/// * `launcher`: Path of the extended launcher, normally `OSGeo4W3.bat`.
/// * `packages`: Package specifiers handed to pip verbatim, in order.
/// * `runner`: Executes the command line.
///
/// # Returns
/// * `Ok(None)` if `packages` is empty; nothing is run.
/// * `Ok(Some(status))` with pip's exit status otherwise. A non-zero status is logged
///   but is not an `Err`: pip failures are reported, not fatal.
/// * `Err` only if the process could not be started.
pub fn install_packages(
    launcher: &Path,
    packages: &[String],
    runner: &dyn ProcessRunner,
) -> Result<Option<i32>> {
    if packages.is_empty() {
        log_debug!("[O4W::Pip] No Python packages requested");
        return Ok(None);
    }

    let command_line = pip_command_line(launcher, packages);
    log_info!("[O4W::Pip] Executing: {}", command_line.cyan());
    let output = runner.run(&command_line)?;

    if output.success() {
        log_info!(
            "[O4W::Pip] Installed Python packages: {}",
            packages.join(", ").green()
        );
        if !output.stdout.is_empty() {
            log_debug!("[O4W::Pip] Stdout: {}", output.stdout);
        }
        // pip prints deprecation notices on stderr even when it succeeds
        if !output.stderr.is_empty() {
            log_warn!("[O4W::Pip] Stderr (might contain warnings): {}", output.stderr.trim());
        }
    } else {
        log_error!(
            "[O4W::Pip] Failed to install Python packages. Exit code: {}. Error: {}",
            output.status.to_string().red(),
            output.stderr.trim().red()
        );
    }
    Ok(Some(output.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::process_runner::fake::RecordingRunner;
    use std::path::PathBuf;

    #[test]
    fn runs_pip_through_the_launcher() {
        let launcher = PathBuf::from(r"D:\OSGeo4W64\OSGeo4W3.bat");
        let packages = vec!["shapely".to_string(), "pyproj".to_string()];
        let runner = RecordingRunner::new();

        let status = install_packages(&launcher, &packages, &runner).unwrap();

        assert_eq!(status, Some(0));
        assert_eq!(
            runner.recorded(),
            vec![r#""D:\OSGeo4W64\OSGeo4W3.bat" python -m pip install shapely pyproj"#.to_string()]
        );
    }

    #[test]
    fn reports_failure_status() {
        let runner = RecordingRunner::new().failing_on("pip install", 1);
        let status = install_packages(Path::new("l.bat"), &["gdalos".to_string()], &runner).unwrap();
        assert_eq!(status, Some(1));
    }

    #[test]
    fn empty_list_runs_nothing() {
        let runner = RecordingRunner::new();
        assert_eq!(install_packages(Path::new("l.bat"), &[], &runner).unwrap(), None);
        assert!(runner.recorded().is_empty());
    }
}
