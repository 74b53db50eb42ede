// `osgeo4w-installer generate`: writes a starter config file.
// Every key in the template is optional; the values shown are the built-in defaults
// so users can see what they would be changing.

use crate::libs::utilities::file_operations::{ensure_dir, write_atomically};
use crate::libs::utilities::path_helpers::{default_config_path, expand_path};
use crate::{log_debug, log_info, log_warn};
use anyhow::{Context, anyhow};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Default content of `config.yaml`.
pub const CONFIG_TEMPLATE: &str = r#"# osgeo4w-installer configuration. Every key is optional.

# Install roots are <root_base><64|32><root_suffix>, e.g. C:\OSGeo4W64-20190704.
root_base: 'C:\OSGeo4W'
# root_suffix defaults to "-" followed by today's date (YYYYMMDD).
# root_suffix: '-stable'
# The installer cache and local package dir is <root_base><setup_suffix>.
setup_suffix: '-Setup'

architectures: [x86_64, x86]   # x86_64 (64-bit) and/or x86 (32-bit)
base_url: http://download.osgeo.org/osgeo4w/
offline_mode: false            # install from the local package dir only
quiet_mode: true               # unattended installer
dev: false                     # add python3-gdal-dev and write OSGeo4W3-dev.bat

# OSGeo4W packages. pyqt5 and sip-qt5 are added when qt5_env is in env_fragments.
packages:
  - python3-gdal
  - python3-pip
  - python3-setuptools
  - gdal-ecw
  - gdal-mrsid
  - gdal-csharp
  - python3-pandas
  - python3-matplotlib
  - gdal201dll
  - gdal204dll

# Installed with pip through OSGeo4W3.bat.
python_packages:
  - angles
  - geographiclib
  - shapely
  - pyproj
  - fidget
  - gdalos
  - transmogripy
  - osgeo4w_installer

# bin\<name>.bat fragments called by OSGeo4W3.bat after o4w_env.
env_fragments:
  - py3_env
  - qt5_env
  - pycharm_env

python_home: apps/Python37
# Directory with the patched gdal.py and the pristine gdal.py.bak it replaces.
# patches_dir: '~/gdalos/gdal_patches'
"#;

pub fn run(output: Option<String>, force: bool) -> anyhow::Result<i32> {
    log_debug!("[Generate] Starting generation with output: {:?}", output);

    let path: PathBuf = match output {
        Some(raw) => PathBuf::from(expand_path(&raw)?),
        None => default_config_path()
            .ok_or_else(|| anyhow!("could not determine the home directory; pass --output"))?,
    };

    write_template(&path, force)?;
    Ok(0)
}

/// Writes the template unless a file is already there (or `force` is set).
/// Returns whether anything was written.
pub fn write_template(path: &Path, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        log_warn!(
            "[Generate] Skipping existing file {}. Use --force to overwrite it.",
            path.display().to_string().yellow()
        );
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    write_atomically(path, CONFIG_TEMPLATE.as_bytes())
        .with_context(|| format!("could not write {}", path.display()))?;
    log_info!("[Generate] Wrote default config to {}", path.display().to_string().green());
    Ok(true)
}
