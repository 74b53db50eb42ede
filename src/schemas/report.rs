// Outcome records collected while the pipeline runs, rendered at the end of `install`.

use crate::cli::type_enums::Architecture;
use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    Succeeded,
    Skipped,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StepStatus::Succeeded => write!(f, "{}", "succeeded".green()),
            StepStatus::Skipped => write!(f, "{}", "skipped".yellow()),
            StepStatus::Failed => write!(f, "{}", "failed".red()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub status: StepStatus,
    pub detail: String,
}

/// Everything that happened for one install root.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub architecture: Architecture,
    pub root: PathBuf,
    pub steps: Vec<StepRecord>,
    /// Exit status of the vendor installer, `None` if it never ran.
    pub installer_status: Option<i32>,
}

impl TargetReport {
    pub fn new(architecture: Architecture, root: PathBuf) -> Self {
        TargetReport {
            architecture,
            root,
            steps: Vec::new(),
            installer_status: None,
        }
    }

    pub fn record(&mut self, step: &str, status: StepStatus, detail: impl Into<String>) {
        self.steps.push(StepRecord {
            step: step.to_string(),
            status,
            detail: detail.into(),
        });
    }

    pub fn status_of(&self, step: &str) -> Option<StepStatus> {
        self.steps.iter().find(|r| r.step == step).map(|r| r.status)
    }

    /// The installer's non-zero status, which halts the rest of the pipeline.
    pub fn installer_failure(&self) -> Option<i32> {
        self.installer_status.filter(|&code| code != 0)
    }

    pub fn has_failures(&self) -> bool {
        self.steps.iter().any(|r| r.status == StepStatus::Failed)
    }
}
