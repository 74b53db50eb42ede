// `osgeo4w-installer plan`: show what `install` would do, without doing it.

use crate::cli::cmd_enums::PlanOverrides;
use crate::installers::pip::pip_command_line;
use crate::installers::setup_exe::SetupInvocation;
use crate::libs::config_loading::resolve_plan;
use crate::libs::launcher::derived_launcher_name;
use crate::libs::pipeline::{DEV_LAUNCHER_SUFFIX, LAUNCHER_SUFFIX};
use crate::schemas::config::InstallPlan;
use anyhow::Context;

/// Human-readable rendering of the plan followed by the per-target command lines.
pub fn render(plan: &InstallPlan) -> anyhow::Result<String> {
    let mut out = serde_yaml::to_string(plan).context("could not render the plan")?;

    for target in plan.targets() {
        let launcher = target.root.join(derived_launcher_name(LAUNCHER_SUFFIX));
        out.push_str(&format!("\n# {} -> {}\n", target.architecture, target.root.display()));
        out.push_str(&format!("download: {} -> {}\n", target.download_url, target.setup_exe.display()));
        out.push_str(&format!(
            "setup: {}\n",
            SetupInvocation::for_target(plan, &target).command_line()
        ));
        out.push_str(&format!("launcher: {}\n", launcher.display()));
        if plan.dev {
            let dev = target.root.join(derived_launcher_name(DEV_LAUNCHER_SUFFIX));
            out.push_str(&format!("dev launcher: {}\n", dev.display()));
        }
        if !plan.python_packages.is_empty() {
            out.push_str(&format!("pip: {}\n", pip_command_line(&launcher, &plan.python_packages)));
        }
    }
    Ok(out)
}

pub fn run(overrides: PlanOverrides) -> anyhow::Result<i32> {
    let plan = resolve_plan(&overrides).context("could not resolve the install plan")?;
    print!("{}", render(&plan)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::config::InstallerConfig;
    use chrono::NaiveDate;

    #[test]
    fn lists_command_lines_per_target() {
        let config = InstallerConfig {
            root_base: Some("/data/OSGeo4W".to_string()),
            dev: Some(true),
            ..Default::default()
        };
        let plan = InstallPlan::resolve(config, NaiveDate::from_ymd_opt(2019, 7, 4).unwrap()).unwrap();
        let text = render(&plan).unwrap();

        assert!(text
            .lines()
            .any(|l| l.starts_with("root_suffix:") && l.contains("-20190704")));
        assert!(text.contains("# x86_64 -> /data/OSGeo4W64-20190704"));
        assert!(text.contains("# x86 -> /data/OSGeo4W32-20190704"));
        assert!(text.contains("--packages python3-gdal-dev"));
        assert!(text.contains("OSGeo4W3-dev.bat"));
        assert!(text.contains("OSGeo4W3.bat\" python -m pip install angles"));
    }
}
