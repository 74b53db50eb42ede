use crate::cli::type_enums::Architecture;
use clap::{Args, Parser, Subcommand};

/// Command-line interface of `osgeo4w-installer`.
#[derive(Parser)]
#[command(name = "osgeo4w-installer")]
#[command(about = "Download OSGeo4W, install packages on its Python interpreter and patch it", long_about = None)]
pub struct Cli {
    /// Enables detailed debug output.
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current version of the tool.
    Version,
    /// Download, install and patch OSGeo4W for every configured architecture.
    Install {
        #[command(flatten)]
        overrides: PlanOverrides,
    },
    /// Print the resolved plan and the exact command lines without running anything.
    Plan {
        #[command(flatten)]
        overrides: PlanOverrides,
    },
    /// Write a commented default configuration file.
    Generate {
        /// Where to write the file (defaults to ~/.osgeo4w-installer/config.yaml).
        #[arg(long)]
        output: Option<String>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Write the PyCharm locator fragment (pycharm_env.bat).
    PycharmEnv {
        /// Destination batch file.
        #[arg(long)]
        output: String,
        /// Newest PyCharm release year to probe.
        #[arg(long, default_value_t = 2020)]
        newest_year: u16,
        /// Oldest PyCharm release year to probe.
        #[arg(long, default_value_t = 2016)]
        oldest_year: u16,
    },
}

/// Flags that override values from the config file.
/// Anything left unset falls back to the file, then to the built-in defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct PlanOverrides {
    /// Path to a YAML config file.
    #[arg(long, env = "OSGEO4W_INSTALLER_CONFIG")]
    pub config: Option<String>,
    /// Architecture to install; repeat for several [possible values: x86_64, x86].
    #[arg(long = "arch")]
    pub architectures: Vec<Architecture>,
    /// Prefix of the install roots, e.g. `D:\OSGeo4W`.
    #[arg(long)]
    pub root_base: Option<String>,
    /// Suffix of the install roots (defaults to -YYYYMMDD).
    #[arg(long)]
    pub root_suffix: Option<String>,
    /// Suffix of the local package directory.
    #[arg(long)]
    pub setup_suffix: Option<String>,
    /// Download site of the installer and its packages.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Install from the local package directory only.
    #[arg(long)]
    pub offline: bool,
    /// Show the installer UI instead of running it in quiet mode.
    #[arg(long)]
    pub interactive: bool,
    /// Also install the GDAL development packages and write OSGeo4W3-dev.bat.
    #[arg(long)]
    pub dev: bool,
    /// Directory holding gdal.py and gdal.py.bak.
    #[arg(long)]
    pub patches_dir: Option<String>,
    /// Interpreter directory relative to the install root.
    #[arg(long)]
    pub python_home: Option<String>,
}
