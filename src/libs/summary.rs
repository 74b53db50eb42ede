// End-of-run summary table.

use crate::schemas::report::TargetReport;
use prettytable::{Table, format, row};

/// One row per recorded step, grouped by target.
pub fn summary_table(reports: &[TargetReport]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Target", "Step", "Status", "Detail"]);

    for report in reports {
        let target = format!("{} ({})", report.root.display(), report.architecture);
        for record in &report.steps {
            table.add_row(row![target, record.step, record.status, record.detail]);
        }
    }
    table
}

pub fn print_summary(reports: &[TargetReport]) {
    if reports.is_empty() {
        return;
    }
    summary_table(reports).printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::type_enums::Architecture;
    use crate::schemas::report::StepStatus;
    use std::path::PathBuf;

    #[test]
    fn one_row_per_step() {
        let mut first = TargetReport::new(Architecture::X86_64, PathBuf::from("r64"));
        first.record("download installer", StepStatus::Succeeded, "cached");
        first.record("run installer", StepStatus::Failed, "exit code 1");
        let mut second = TargetReport::new(Architecture::X86, PathBuf::from("r32"));
        second.record("download installer", StepStatus::Skipped, "");

        let table = summary_table(&[first, second]);
        assert_eq!(table.len(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("r64 (x86_64)"));
        assert!(rendered.contains("exit code 1"));
    }
}
