// Orchestrates one run: for every install target, fetch -> install -> launchers ->
// pip -> patches, collecting a `TargetReport`.
//
// Every step is idempotent, so a failed run is retried by running it again from the
// top. A non-zero installer exit stops that target; the remaining steps depend on
// the install being there. Pip and patch results are reported and do not stop
// anything. Download and filesystem errors abort the whole run.

use crate::errors::{InstallerError, Result};
// Step implementations, one module per component.
use crate::installers::fetcher::{Downloader, FetchOutcome, ensure_file};
use crate::installers::pip::install_packages;
use crate::installers::setup_exe::SetupInvocation;
use crate::libs::launcher::{BASE_LAUNCHER, extend_launcher};
use crate::libs::patcher::{FilePatch, LibraryCopy, copy_library, geos_library_paths};
use crate::libs::process_runner::ProcessRunner;
use crate::libs::pycharm_env::{PYCHARM_FRAGMENT_FILE, write_pycharm_env};
// The resolved plan drives everything; reports collect what happened.
use crate::schemas::config::{InstallPlan, InstallTarget};
use crate::schemas::report::{StepStatus, TargetReport};
use crate::{log_error, log_info, log_warn};
use colored::Colorize;

pub const STEP_FETCH: &str = "download installer";
pub const STEP_SETUP: &str = "run installer";
pub const STEP_LAUNCHER: &str = "extend launcher";
pub const STEP_DEV_LAUNCHER: &str = "extend dev launcher";
pub const STEP_PYCHARM: &str = "create pycharm_env.bat";
pub const STEP_PIP: &str = "pip install";
pub const STEP_GEOS: &str = "copy geos_c.dll";
pub const STEP_GDAL: &str = "patch gdal.py";

/// Suffix of the launcher that pip runs through (`OSGeo4W3.bat`).
pub const LAUNCHER_SUFFIX: &str = "3";
pub const DEV_LAUNCHER_SUFFIX: &str = "3-dev";

// Newest and oldest PyCharm release years probed by the generated fragment.
const PYCHARM_NEWEST_YEAR: u16 = 2020;
const PYCHARM_OLDEST_YEAR: u16 = 2016;

/// Result of [`Pipeline::run`].
#[derive(Debug)]
pub struct RunOutcome {
    pub reports: Vec<TargetReport>,
    /// Download or filesystem error that stopped the run.
    pub aborted: Option<InstallerError>,
}

pub struct Pipeline<'a> {
    plan: &'a InstallPlan,
    runner: &'a dyn ProcessRunner,
    downloader: &'a dyn Downloader,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        plan: &'a InstallPlan,
        runner: &'a dyn ProcessRunner,
        downloader: &'a dyn Downloader,
    ) -> Self {
        Pipeline {
            plan,
            runner,
            downloader,
        }
    }

    /// Runs every target in order.
    ///
    /// A failed installer on one target does not stop the next one; it only shows up
    /// in that target's report and in [`exit_code`]. A download or filesystem error
    /// stops the run, but the reports of the targets that already finished are kept
    /// so the summary can still show them.
    ///
    /// # Returns
    /// A [`RunOutcome`] with one report per finished target and the error that
    /// stopped the run, if any.
    pub fn run(&self) -> RunOutcome {
        let mut reports = Vec::new();
        for target in self.plan.targets() {
            match self.run_target(&target) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    log_error!(
                        "[O4W] Run stopped while working on {}: {}",
                        target.root.display(),
                        e
                    );
                    return RunOutcome {
                        reports,
                        aborted: Some(e),
                    };
                }
            }
        }
        RunOutcome {
            reports,
            aborted: None,
        }
    }

    /// Runs all steps for one install root.
    ///
    /// # Arguments
    /// * `target` - One architecture's install root, installer path and download URL.
    ///
    /// # Returns
    /// The step records of this target. `Err` only for download and filesystem
    /// errors; a failing installer, pip or patch is recorded in the report instead.
    pub fn run_target(&self, target: &InstallTarget) -> Result<TargetReport> {
        let plan = self.plan;
        let root = &target.root;
        let mut report = TargetReport::new(target.architecture, root.clone());

        log_info!("{}", "-".repeat(50));
        log_info!(
            "[O4W] OSGeo4W setup ({}): {}",
            target.architecture.to_string().bold(),
            target.setup_exe.display()
        );
        log_info!("[O4W] Root: {}", root.display().to_string().cyan());
        log_info!("[O4W] Local package dir: {}", target.local_package_dir.display());
        log_info!("[O4W] Package list: {:?}", plan.packages);
        log_info!("[O4W] Python package list: {:?}", plan.python_packages);

        // Step 1: installer executable
        let fetched = ensure_file(&target.download_url, &target.setup_exe, self.downloader)?;
        let detail = match fetched {
            FetchOutcome::Cached => "cached",
            FetchOutcome::Downloaded => "downloaded",
        };
        report.record(STEP_FETCH, StepStatus::Succeeded, detail);

        // Step 2: vendor installer; non-zero ends this target
        let status = SetupInvocation::for_target(plan, target).run(self.runner)?;
        report.installer_status = Some(status);
        if status != 0 {
            report.record(STEP_SETUP, StepStatus::Failed, format!("exit code {status}"));
            log_warn!(
                "[O4W] Installation into {} failed; skipping remaining steps",
                root.display()
            );
            return Ok(report);
        }
        report.record(STEP_SETUP, StepStatus::Succeeded, "exit code 0");

        // Step 3: derived launchers
        let base_launcher = root.join(BASE_LAUNCHER);
        let launcher = extend_launcher(&base_launcher, root, &plan.env_fragments, LAUNCHER_SUFFIX)?;
        record_launcher(&mut report, STEP_LAUNCHER, launcher.inserted, plan.env_fragments.len());

        if plan.dev {
            let fragments = plan.dev_fragments();
            let dev = extend_launcher(&base_launcher, root, &fragments, DEV_LAUNCHER_SUFFIX)?;
            record_launcher(&mut report, STEP_DEV_LAUNCHER, dev.inserted, fragments.len());
        }

        // Step 4: IDE locator fragment the launcher calls
        if plan.wants_pycharm_fragment() {
            let fragment = root.join("bin").join(PYCHARM_FRAGMENT_FILE);
            write_pycharm_env(&fragment, PYCHARM_NEWEST_YEAR, PYCHARM_OLDEST_YEAR)?;
            report.record(STEP_PYCHARM, StepStatus::Succeeded, fragment.display().to_string());
        }

        // Step 5: Python packages through the extended environment
        match install_packages(&launcher.path, &plan.python_packages, self.runner)? {
            None => report.record(STEP_PIP, StepStatus::Skipped, "no packages requested"),
            Some(0) => report.record(
                STEP_PIP,
                StepStatus::Succeeded,
                format!("{} package(s)", plan.python_packages.len()),
            ),
            Some(code) => report.record(STEP_PIP, StepStatus::Failed, format!("exit code {code}")),
        }

        // Step 6: patches, independent of each other and of pip
        let (geos_source, geos_destination) = geos_library_paths(root, &plan.python_home);
        match copy_library(&geos_source, &geos_destination)? {
            LibraryCopy::Copied => report.record(STEP_GEOS, StepStatus::Succeeded, "copied"),
            LibraryCopy::AlreadyPresent => {
                report.record(STEP_GEOS, StepStatus::Succeeded, "already present")
            }
            LibraryCopy::SourceMissing => report.record(
                STEP_GEOS,
                StepStatus::Skipped,
                format!("{} not found", geos_source.display()),
            ),
        }

        match &plan.patches_dir {
            Some(patches_dir) => {
                let outcome = FilePatch::gdal(patches_dir, root, &plan.python_home).apply()?;
                let status = if outcome.is_success() {
                    StepStatus::Succeeded
                } else {
                    StepStatus::Failed
                };
                report.record(STEP_GDAL, status, outcome.to_string());
            }
            None => report.record(STEP_GDAL, StepStatus::Skipped, "patches_dir not configured"),
        }

        log_info!("{}", "-".repeat(50));
        Ok(report)
    }
}

fn record_launcher(report: &mut TargetReport, step: &str, inserted: usize, requested: usize) {
    if inserted == 0 && requested > 0 {
        report.record(step, StepStatus::Skipped, "anchor line not found, plain copy");
    } else {
        report.record(step, StepStatus::Succeeded, format!("{inserted} fragment call(s)"));
    }
}

/// Process exit code for a finished run: the first failing installer status, else 0.
pub fn exit_code(reports: &[TargetReport]) -> i32 {
    reports
        .iter()
        .find_map(TargetReport::installer_failure)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::type_enums::Architecture;
    use crate::installers::fetcher::fake::StaticDownloader;
    use crate::libs::process_runner::fake::RecordingRunner;
    use crate::schemas::config::InstallerConfig;
    use chrono::NaiveDate;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{TempDir, tempdir};

    const BASE_BAT: &str = "@echo off\r\nset OSGEO4W_ROOT=%~dp0\r\ncall \"%~dp0\\bin\\o4w_env.bat\"\r\n@echo on\r\n";
    const GDAL_ORIGINAL: &[u8] = b"original gdal\n";
    const GDAL_PATCHED: &[u8] = b"patched gdal\n";

    fn plan_in(dir: &Path, fragments: &[&str], dev: bool) -> InstallPlan {
        let patches = dir.join("gdal_patches");
        fs::create_dir_all(&patches).unwrap();
        fs::write(patches.join("gdal.py"), GDAL_PATCHED).unwrap();
        fs::write(patches.join("gdal.py.bak"), GDAL_ORIGINAL).unwrap();

        let config = InstallerConfig {
            root_base: Some(dir.join("OSGeo4W").display().to_string()),
            architectures: Some(vec![Architecture::X86_64]),
            root_suffix: Some(String::new()),
            env_fragments: Some(fragments.iter().map(|s| s.to_string()).collect()),
            python_packages: Some(vec!["shapely".to_string(), "gdalos".to_string()]),
            patches_dir: Some(patches.display().to_string()),
            dev: Some(dev),
            ..Default::default()
        };
        InstallPlan::resolve(config, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()).unwrap()
    }

    /// What the vendor installer leaves behind: the base launcher, geos in bin/
    /// and gdal.py in the interpreter tree.
    fn simulate_install(plan: &InstallPlan, gdal: &[u8]) -> InstallTarget {
        let target = plan.targets().remove(0);
        simulate_install_into(plan, &target, gdal);
        target
    }

    fn simulate_install_into(plan: &InstallPlan, target: &InstallTarget, gdal: &[u8]) {
        fs::create_dir_all(target.root.join("bin")).unwrap();
        fs::write(target.root.join(BASE_LAUNCHER), BASE_BAT).unwrap();
        fs::write(target.root.join("bin").join("geos_c.dll"), b"geos").unwrap();
        let patch = FilePatch::gdal(plan.patches_dir.as_ref().unwrap(), &target.root, &plan.python_home);
        fs::create_dir_all(patch.destination.parent().unwrap()).unwrap();
        fs::write(&patch.destination, gdal).unwrap();
    }

    fn setup() -> (TempDir, InstallPlan, InstallTarget) {
        let dir = tempdir().unwrap();
        let plan = plan_in(dir.path(), &["A", "B", "C"], false);
        let target = simulate_install(&plan, GDAL_PATCHED);
        (dir, plan, target)
    }

    #[test]
    fn end_to_end_fresh_target() {
        let (_dir, plan, target) = setup();
        let runner = RecordingRunner::new();
        let downloader = StaticDownloader::new(b"MZ");

        let report = Pipeline::new(&plan, &runner, &downloader).run_target(&target).unwrap();

        // installer fetched once
        assert_eq!(downloader.calls.get(), 1);
        assert!(target.setup_exe.is_file());
        assert_eq!(report.installer_status, Some(0));

        // exactly three fragment lines after the anchor
        let derived = fs::read_to_string(target.root.join("OSGeo4W3.bat")).unwrap();
        assert_eq!(derived.lines().count(), BASE_BAT.lines().count() + 3);
        assert!(derived.contains(
            "o4w_env.bat\"\r\ncall \"%~dp0\\bin\\A.bat\"\r\ncall \"%~dp0\\bin\\B.bat\"\r\ncall \"%~dp0\\bin\\C.bat\"\r\n@echo on"
        ));

        // installer, then pip through the derived launcher
        let commands = runner.recorded();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].contains("osgeo4w-setup-x86_64.exe\" --autoaccept --advanced --quiet-mode"));
        assert!(commands[1].ends_with("OSGeo4W3.bat\" python -m pip install shapely gdalos"));

        let (_, geos_destination) = geos_library_paths(&target.root, &plan.python_home);
        assert_eq!(fs::read(geos_destination).unwrap(), b"geos");
        assert_eq!(report.status_of(STEP_GEOS), Some(StepStatus::Succeeded));
        assert_eq!(report.status_of(STEP_GDAL), Some(StepStatus::Succeeded));
        assert_eq!(report.status_of(STEP_PIP), Some(StepStatus::Succeeded));
        assert!(!report.has_failures());
        assert_eq!(exit_code(&[report]), 0);
    }

    #[test]
    fn second_run_only_confirms() {
        let (_dir, plan, target) = setup();
        let runner = RecordingRunner::new();
        let downloader = StaticDownloader::new(b"MZ");
        let pipeline = Pipeline::new(&plan, &runner, &downloader);

        pipeline.run_target(&target).unwrap();
        let launcher = fs::read(target.root.join("OSGeo4W3.bat")).unwrap();
        let second = pipeline.run_target(&target).unwrap();

        assert_eq!(downloader.calls.get(), 1);
        let fetch = second.steps.iter().find(|s| s.step == STEP_FETCH).unwrap();
        assert_eq!(fetch.detail, "cached");
        let geos = second.steps.iter().find(|s| s.step == STEP_GEOS).unwrap();
        assert_eq!(geos.detail, "already present");
        let gdal = second.steps.iter().find(|s| s.step == STEP_GDAL).unwrap();
        assert_eq!(gdal.detail, "already patched");
        assert_eq!(fs::read(target.root.join("OSGeo4W3.bat")).unwrap(), launcher);
    }

    #[test]
    fn installer_failure_halts_the_target() {
        let (_dir, plan, target) = setup();
        let runner = RecordingRunner::new().failing_on("--autoaccept", 2);
        let downloader = StaticDownloader::new(b"MZ");

        let report = Pipeline::new(&plan, &runner, &downloader).run_target(&target).unwrap();

        assert_eq!(report.installer_failure(), Some(2));
        assert_eq!(report.status_of(STEP_SETUP), Some(StepStatus::Failed));
        assert_eq!(report.status_of(STEP_LAUNCHER), None);
        assert_eq!(runner.recorded().len(), 1);
        assert!(!target.root.join("OSGeo4W3.bat").exists());
        assert_eq!(exit_code(&[report]), 2);
    }

    #[test]
    fn pip_failure_does_not_stop_patches() {
        let (_dir, plan, target) = setup();
        let runner = RecordingRunner::new().failing_on("pip install", 1);
        let downloader = StaticDownloader::new(b"MZ");

        let report = Pipeline::new(&plan, &runner, &downloader).run_target(&target).unwrap();

        assert_eq!(report.status_of(STEP_PIP), Some(StepStatus::Failed));
        assert_eq!(report.status_of(STEP_GEOS), Some(StepStatus::Succeeded));
        assert_eq!(report.status_of(STEP_GDAL), Some(StepStatus::Succeeded));
        assert_eq!(exit_code(&[report]), 0);
    }

    #[test]
    fn dev_and_pycharm_extras() {
        let dir = tempdir().unwrap();
        let plan = plan_in(dir.path(), &["py3_env", "pycharm_env"], true);
        let target = simulate_install(&plan, GDAL_ORIGINAL);
        let runner = RecordingRunner::new();
        let downloader = StaticDownloader::new(b"MZ");

        let report = Pipeline::new(&plan, &runner, &downloader).run_target(&target).unwrap();

        let dev = fs::read_to_string(target.root.join("OSGeo4W3-dev.bat")).unwrap();
        assert!(dev.contains("pycharm_env.bat\"\r\ncall \"%~dp0\\bin\\gdal-dev-py3-env.bat\"\r\ncall \"%~dp0\\bin\\proj-dev-env.bat\"\r\n"));
        assert!(target.root.join("bin").join("pycharm_env.bat").is_file());
        assert_eq!(report.status_of(STEP_PYCHARM), Some(StepStatus::Succeeded));
        assert!(runner.recorded()[0].contains("--packages python3-gdal-dev"));

        // gdal.py matched the expected original, so it was swapped and backed up
        let gdal = report.steps.iter().find(|s| s.step == STEP_GDAL).unwrap();
        assert_eq!(gdal.detail, "patched");
    }

    #[test]
    fn missing_anchor_is_reported_as_skip() {
        let (_dir, plan, target) = setup();
        fs::write(target.root.join(BASE_LAUNCHER), "@echo off\r\n").unwrap();
        let runner = RecordingRunner::new();
        let downloader = StaticDownloader::new(b"MZ");

        let report = Pipeline::new(&plan, &runner, &downloader).run_target(&target).unwrap();

        assert_eq!(report.status_of(STEP_LAUNCHER), Some(StepStatus::Skipped));
        assert_eq!(
            fs::read_to_string(target.root.join("OSGeo4W3.bat")).unwrap(),
            "@echo off\r\n"
        );
    }

    #[test]
    fn failed_installer_on_first_target_does_not_stop_the_second() {
        let dir = tempdir().unwrap();
        let mut plan = plan_in(dir.path(), &["py3_env"], false);
        plan.architectures = vec![Architecture::X86_64, Architecture::X86];
        for target in plan.targets() {
            simulate_install_into(&plan, &target, GDAL_ORIGINAL);
        }
        let runner = RecordingRunner::new().failing_on("osgeo4w-setup-x86_64.exe", 2);
        let downloader = StaticDownloader::new(b"MZ");

        let outcome = Pipeline::new(&plan, &runner, &downloader).run();

        assert!(outcome.aborted.is_none());
        assert_eq!(outcome.reports.len(), 2);
        let (first, second) = (&outcome.reports[0], &outcome.reports[1]);
        assert_eq!(first.architecture, Architecture::X86_64);
        assert_eq!(first.installer_failure(), Some(2));
        assert_eq!(first.status_of(STEP_GDAL), None);
        assert_eq!(second.architecture, Architecture::X86);
        assert_eq!(second.installer_status, Some(0));
        assert_eq!(second.status_of(STEP_GDAL), Some(StepStatus::Succeeded));
        assert!(second.root.join("OSGeo4W3.bat").is_file());
        assert_eq!(downloader.calls.get(), 2);
        assert_eq!(exit_code(&outcome.reports), 2);
    }

    #[test]
    fn exit_code_is_the_first_failing_installer() {
        let mut reports = Vec::new();
        for (architecture, status) in [(Architecture::X86_64, 0), (Architecture::X86, 5)] {
            let mut report = TargetReport::new(architecture, PathBuf::from("C:/OSGeo4W"));
            report.installer_status = Some(status);
            reports.push(report);
        }
        assert_eq!(exit_code(&reports), 5);
        reports[0].installer_status = Some(3);
        assert_eq!(exit_code(&reports), 3);
        assert_eq!(exit_code(&[]), 0);
    }

    #[test]
    fn filesystem_error_keeps_finished_reports() {
        let dir = tempdir().unwrap();
        let mut plan = plan_in(dir.path(), &["py3_env"], false);
        plan.architectures = vec![Architecture::X86_64, Architecture::X86];
        // only the 64-bit root gets a launcher; the 32-bit one cannot be extended
        let first = plan.targets().remove(0);
        simulate_install_into(&plan, &first, GDAL_PATCHED);
        let runner = RecordingRunner::new();
        let downloader = StaticDownloader::new(b"MZ");

        let outcome = Pipeline::new(&plan, &runner, &downloader).run();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].architecture, Architecture::X86_64);
        assert!(!outcome.reports[0].has_failures());
        assert!(matches!(outcome.aborted, Some(InstallerError::Io { .. })));
    }
}
