// `osgeo4w-installer version`

use crate::log_info;
use crate::schemas::config::DEFAULT_BASE_URL;
use colored::Colorize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> anyhow::Result<i32> {
    println!("{} {}", env!("CARGO_PKG_NAME"), VERSION);
    log_info!("Default download site: {}", DEFAULT_BASE_URL.cyan());
    Ok(0)
}
