// The seam between the pipeline and external programs.
//
// The installer steps only ever hand a complete command line to a `ProcessRunner`
// and look at the exit status it returns. Production code goes through the host
// shell; tests substitute a recorder.

use crate::errors::{InstallerError, Result};
use crate::log_debug;
use colored::Colorize;
use std::process::Command;

/// Result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `-1` when the process was terminated without one.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs a full command line and blocks until it exits.
pub trait ProcessRunner {
    fn run(&self, command_line: &str) -> Result<ProcessOutput>;
}

/// Runs command lines through `cmd /C` on Windows and `sh -c` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn run(&self, command_line: &str) -> Result<ProcessOutput> {
        log_debug!("[O4W::Shell] Spawning: {}", command_line.dimmed());

        let output = shell_command(command_line)
            .output()
            .map_err(|source| InstallerError::Spawn {
                command: command_line.to_string(),
                source,
            })?;

        let result = ProcessOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log_debug!("[O4W::Shell] Exit status: {}", result.status);
        Ok(result)
    }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    use std::os::windows::process::CommandExt;
    // cmd strips the outer quotes and keeps the inner quoting of paths intact.
    let mut command = Command::new("cmd");
    command.arg("/C").raw_arg(format!("\"{command_line}\""));
    command
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}
