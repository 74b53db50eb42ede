// Configuration schema and the resolved install plan.
//
// `InstallerConfig` mirrors the YAML file: every key optional.
// `InstallPlan` is what the pipeline consumes: every default applied exactly once.

use crate::cli::type_enums::Architecture;
use crate::errors::{InstallerError, Result};
use crate::libs::utilities::path_helpers::expand_path;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Download site of the installer executables and the package mirror.
pub const DEFAULT_BASE_URL: &str = "http://download.osgeo.org/osgeo4w/";
pub const DEFAULT_ROOT_BASE: &str = r"C:\OSGeo4W";
pub const DEFAULT_SETUP_SUFFIX: &str = "-Setup";
/// Interpreter location inside the install root.
pub const DEFAULT_PYTHON_HOME: &str = "apps/Python37";

/// Fragment every launcher already calls; extra fragments are chained after it.
pub const BASE_FRAGMENT: &str = "o4w_env";
pub const QT5_FRAGMENT: &str = "qt5_env";
pub const PYCHARM_FRAGMENT: &str = "pycharm_env";
/// Appended to the fragment list of the dev launcher.
pub const DEV_FRAGMENTS: [&str; 2] = ["gdal-dev-py3-env", "proj-dev-env"];
/// Packages the Qt5 fragment needs.
pub const QT5_PACKAGES: [&str; 2] = ["pyqt5", "sip-qt5"];
pub const DEV_PACKAGE: &str = "python3-gdal-dev";

const DEFAULT_PACKAGES: [&str; 10] = [
    "python3-gdal",
    "python3-pip",
    "python3-setuptools",
    "gdal-ecw",
    "gdal-mrsid",
    "gdal-csharp",
    "python3-pandas",
    "python3-matplotlib",
    "gdal201dll",
    "gdal204dll",
];

const DEFAULT_PYTHON_PACKAGES: [&str; 8] = [
    "angles",
    "geographiclib",
    "shapely",
    "pyproj",
    "fidget",
    "gdalos",
    "transmogripy",
    "osgeo4w_installer",
];

const DEFAULT_FRAGMENTS: [&str; 3] = ["py3_env", QT5_FRAGMENT, PYCHARM_FRAGMENT];

/// The on-disk configuration file. Unset keys take the documented defaults.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    pub root_base: Option<String>,
    pub architectures: Option<Vec<Architecture>>,
    pub root_suffix: Option<String>,
    pub setup_suffix: Option<String>,
    pub base_url: Option<String>,
    pub offline_mode: Option<bool>,
    pub quiet_mode: Option<bool>,
    pub dev: Option<bool>,
    pub packages: Option<Vec<String>>,
    pub python_packages: Option<Vec<String>>,
    pub env_fragments: Option<Vec<String>>,
    pub python_home: Option<String>,
    pub patches_dir: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, Serialize)]
pub struct InstallPlan {
    pub root_base: String,
    pub architectures: Vec<Architecture>,
    pub root_suffix: String,
    pub setup_suffix: String,
    pub base_url: String,
    pub offline_mode: bool,
    pub quiet_mode: bool,
    pub dev: bool,
    pub packages: Vec<String>,
    pub python_packages: Vec<String>,
    pub env_fragments: Vec<String>,
    pub python_home: PathBuf,
    pub patches_dir: Option<PathBuf>,
}

/// Everything that is specific to one architecture.
#[derive(Debug, Clone, Serialize)]
pub struct InstallTarget {
    pub architecture: Architecture,
    pub root: PathBuf,
    pub local_package_dir: PathBuf,
    pub setup_exe: PathBuf,
    pub download_url: String,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn push_missing(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

impl InstallPlan {
    /// Applies defaults to `config`. `today` feeds the default `-YYYYMMDD` root suffix.
    pub fn resolve(config: InstallerConfig, today: NaiveDate) -> Result<Self> {
        let root_base = expand_path(config.root_base.as_deref().unwrap_or(DEFAULT_ROOT_BASE))?;
        if root_base.trim().is_empty() {
            return Err(InstallerError::InvalidConfig("root_base is empty".to_string()));
        }

        let architectures = config
            .architectures
            .unwrap_or_else(|| vec![Architecture::X86_64, Architecture::X86]);
        if architectures.is_empty() {
            return Err(InstallerError::InvalidConfig(
                "at least one architecture is required".to_string(),
            ));
        }

        let mut base_url = config.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(InstallerError::InvalidConfig("base_url is empty".to_string()));
        }
        // The installer filename is appended verbatim.
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let dev = config.dev.unwrap_or(false);
        let env_fragments = config.env_fragments.unwrap_or_else(|| owned(&DEFAULT_FRAGMENTS));

        let mut packages = config.packages.unwrap_or_else(|| owned(&DEFAULT_PACKAGES));
        if dev {
            push_missing(&mut packages, DEV_PACKAGE);
        }
        if env_fragments.iter().any(|f| f == QT5_FRAGMENT) {
            for package in QT5_PACKAGES {
                push_missing(&mut packages, package);
            }
        }

        let patches_dir = match config.patches_dir {
            Some(dir) => Some(PathBuf::from(expand_path(&dir)?)),
            None => None,
        };

        Ok(InstallPlan {
            root_base,
            architectures,
            root_suffix: config
                .root_suffix
                .unwrap_or_else(|| format!("-{}", today.format("%Y%m%d"))),
            setup_suffix: config
                .setup_suffix
                .unwrap_or_else(|| DEFAULT_SETUP_SUFFIX.to_string()),
            base_url,
            offline_mode: config.offline_mode.unwrap_or(false),
            quiet_mode: config.quiet_mode.unwrap_or(true),
            dev,
            packages,
            python_packages: config
                .python_packages
                .unwrap_or_else(|| owned(&DEFAULT_PYTHON_PACKAGES)),
            env_fragments,
            python_home: PathBuf::from(
                config.python_home.as_deref().unwrap_or(DEFAULT_PYTHON_HOME),
            ),
            patches_dir,
        })
    }

    /// One target per architecture, in configured order.
    /// The local package directory (which also caches the installers) is shared.
    pub fn targets(&self) -> Vec<InstallTarget> {
        let local_package_dir = PathBuf::from(format!("{}{}", self.root_base, self.setup_suffix));
        self.architectures
            .iter()
            .map(|&architecture| InstallTarget {
                architecture,
                root: PathBuf::from(format!(
                    "{}{}{}",
                    self.root_base,
                    architecture.root_suffix(),
                    self.root_suffix
                )),
                setup_exe: local_package_dir.join(architecture.setup_filename()),
                download_url: format!("{}{}", self.base_url, architecture.setup_filename()),
                local_package_dir: local_package_dir.clone(),
            })
            .collect()
    }

    /// Fragment list of `OSGeo4W3-dev.bat`.
    pub fn dev_fragments(&self) -> Vec<String> {
        let mut fragments = self.env_fragments.clone();
        fragments.extend(DEV_FRAGMENTS.iter().map(|f| f.to_string()));
        fragments
    }

    pub fn wants_pycharm_fragment(&self) -> bool {
        self.env_fragments.iter().any(|f| f == PYCHARM_FRAGMENT)
    }
}
