// Installer Invoker: builds and runs the OSGeo4W setup command line.
//
// Flags understood by osgeo4w-setup:
//   --autoaccept --advanced          always
//   --quiet-mode                     unattended install
//   --local-install                  install from the local package directory only
//   --site <url>                     package mirror
//   --root "<dir>"                   install root
//   --local-package-dir "<dir>"      download cache
//   --packages <id>                  once per package

use crate::errors::Result;
use crate::libs::process_runner::ProcessRunner;
use crate::schemas::config::{InstallPlan, InstallTarget};
use crate::{log_debug, log_error, log_info};
use colored::Colorize;
use std::path::Path;

/// Wraps a path in double quotes for the shell.
pub(crate) fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Inputs of one installer invocation.
#[derive(Debug, Clone)]
pub struct SetupInvocation<'a> {
    pub setup_exe: &'a Path,
    pub site: &'a str,
    pub root: &'a Path,
    pub local_package_dir: &'a Path,
    pub packages: &'a [String],
    pub quiet_mode: bool,
    pub offline_mode: bool,
}

impl<'a> SetupInvocation<'a> {
    pub fn for_target(plan: &'a InstallPlan, target: &'a InstallTarget) -> Self {
        SetupInvocation {
            setup_exe: &target.setup_exe,
            site: &plan.base_url,
            root: &target.root,
            local_package_dir: &target.local_package_dir,
            packages: &plan.packages,
            quiet_mode: plan.quiet_mode,
            offline_mode: plan.offline_mode,
        }
    }

    /// The full command line, in the order the installer documents its flags.
    pub fn command_line(&self) -> String {
        let mut parts = vec![
            quoted(self.setup_exe),
            "--autoaccept".to_string(),
            "--advanced".to_string(),
        ];
        if self.quiet_mode {
            parts.push("--quiet-mode".to_string());
        }
        if self.offline_mode {
            parts.push("--local-install".to_string());
        }
        parts.extend([
            "--site".to_string(),
            self.site.to_string(),
            "--root".to_string(),
            quoted(self.root),
            "--local-package-dir".to_string(),
            quoted(self.local_package_dir),
        ]);
        parts.extend(self.packages.iter().map(|p| format!("--packages {p}")));
        parts.join(" ")
    }

    /// Runs the vendor installer and waits for it to finish.
    ///
    /// # Arguments
    /// * `runner`: Executes the command line built by [`Self::command_line`].
    ///
    /// # Returns
    /// * `Ok(status)` with the installer's exit status, unchanged. Zero means the
    ///   install root is ready for the launcher and patch steps; anything else is
    ///   logged with the installer's stderr.
    /// * `Err` only if the process could not be started.
    pub fn run(&self, runner: &dyn ProcessRunner) -> Result<i32> {
        let command_line = self.command_line();
        log_info!("[O4W::Setup] Executing: {}", command_line.cyan());

        let output = runner.run(&command_line)?;
        if !output.stdout.is_empty() {
            log_debug!("[O4W::Setup] Stdout: {}", output.stdout);
        }
        if output.success() {
            log_info!(
                "[O4W::Setup] Installation into {} finished",
                self.root.display().to_string().green()
            );
        } else {
            log_error!(
                "[O4W::Setup] Installation failed. Exit code: {}. {}",
                output.status.to_string().red(),
                output.stderr.trim()
            );
        }
        Ok(output.status)
    }
}
