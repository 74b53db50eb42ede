// `osgeo4w-installer install`: resolve the plan once, run every target and print
// the summary. The process exit code is the first failing installer status.

use crate::cli::cmd_enums::PlanOverrides;
use crate::installers::fetcher::HttpDownloader;
use crate::libs::config_loading::resolve_plan;
use crate::libs::pipeline::{Pipeline, exit_code};
use crate::libs::process_runner::ShellRunner;
use crate::libs::summary::print_summary;
use crate::{log_debug, log_info, log_warn};
use anyhow::Context;

pub fn run(overrides: PlanOverrides) -> anyhow::Result<i32> {
    log_debug!("Entered install::run() with {:?}", overrides);

    let plan = resolve_plan(&overrides).context("could not resolve the install plan")?;
    let runner = ShellRunner;
    let downloader = HttpDownloader;
    let outcome = Pipeline::new(&plan, &runner, &downloader).run();

    print_summary(&outcome.reports);
    if let Some(e) = outcome.aborted {
        return Err(anyhow::Error::new(e)
            .context("install aborted; fix the problem and re-run, completed steps are skipped"));
    }

    let reports = outcome.reports;

    if reports.iter().any(|r| r.has_failures()) {
        log_warn!("Some steps failed; see the summary above");
    }
    let code = exit_code(&reports);
    if code == 0 {
        log_info!("'osgeo4w-installer install' completed");
    }
    Ok(code)
}
