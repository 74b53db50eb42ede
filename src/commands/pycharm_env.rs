// `osgeo4w-installer pycharm-env`: writes the PyCharm locator fragment on its own,
// e.g. for an OSGeo4W install that was not made by this tool.

use crate::libs::pycharm_env::write_pycharm_env;
use crate::libs::utilities::path_helpers::expand_path;
use anyhow::Context;
use std::path::PathBuf;

pub fn run(output: String, newest_year: u16, oldest_year: u16) -> anyhow::Result<i32> {
    let path = PathBuf::from(expand_path(&output)?);
    write_pycharm_env(&path, newest_year, oldest_year)
        .with_context(|| format!("could not create {}", path.display()))?;
    Ok(0)
}
