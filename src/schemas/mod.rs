// Data structures: the configuration file, the resolved plan and the run report.
pub mod config;
pub mod report;
