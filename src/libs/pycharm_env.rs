// PyCharm locator fragment (`bin\pycharm_env.bat`).
//
// The fragment probes every plausible PyCharm install location, newest release
// first, and leaves the first hit in %PYCHARM%. It exits with code 3 when nothing
// was found so that a launcher chaining it can tell.

use crate::errors::{InstallerError, Result};
use crate::libs::utilities::file_operations::write_atomically;
use crate::log_info;
use colored::Colorize;
use std::path::Path;

pub const PYCHARM_FRAGMENT_FILE: &str = "pycharm_env.bat";

const PROBE_PREFIX: &str = "if not exist %PYCHARM% SET PYCHARM=";
const PROGRAM_FILES: [&str; 2] = [r"C:\Program Files", r"C:\Program Files (x86)"];
const EDITIONS: [&str; 2] = ["Community Edition ", ""];
const EXECUTABLES: [&str; 2] = [r"bin\pycharm64.exe", r"bin\pycharm.exe"];
const QUARTERS: [u8; 3] = [3, 2, 1];
const EOL: &str = "\r\n";

/// PyCharm version strings from `newest_year` down to `oldest_year`, quarters 3..1,
/// builds 9..0. Build 0 is written without its `.0` ("2019.3").
pub fn pycharm_versions(newest_year: u16, oldest_year: u16) -> Vec<String> {
    let mut versions = Vec::new();
    for year in (oldest_year..=newest_year).rev() {
        for quarter in QUARTERS {
            for build in (0..=9u8).rev() {
                if build == 0 {
                    versions.push(format!("{year}.{quarter}"));
                } else {
                    versions.push(format!("{year}.{quarter}.{build}"));
                }
            }
        }
    }
    versions
}

/// Batch file body probing every version x location x edition x executable.
pub fn render_pycharm_env(newest_year: u16, oldest_year: u16) -> String {
    let mut out = String::new();
    out.push_str("@echo off");
    out.push_str(EOL);
    out.push_str("set PYCHARM=\"xxxxxx\"");
    out.push_str(EOL);
    out.push_str(EOL);

    for version in pycharm_versions(newest_year, oldest_year) {
        out.push_str(&format!(":: version {version}{EOL}"));
        for program_files in PROGRAM_FILES {
            for edition in EDITIONS {
                for executable in EXECUTABLES {
                    out.push_str(&format!(
                        "{PROBE_PREFIX}\"{program_files}\\JetBrains\\PyCharm {edition}{version}\\{executable}\"{EOL}"
                    ));
                }
            }
        }
        out.push_str(EOL);
    }

    out.push_str("echo %PYCHARM%");
    out.push_str(EOL);
    out.push_str("if not exist %PYCHARM% exit /b 3");
    out
}

/// Writes the fragment to `output`.
pub fn write_pycharm_env(output: &Path, newest_year: u16, oldest_year: u16) -> Result<()> {
    if newest_year < oldest_year {
        return Err(InstallerError::InvalidConfig(format!(
            "newest year {newest_year} is older than oldest year {oldest_year}"
        )));
    }
    write_atomically(output, render_pycharm_env(newest_year, oldest_year).as_bytes())?;
    log_info!(
        "[O4W::PyCharm] Wrote {}",
        output.display().to_string().cyan()
    );
    Ok(())
}
