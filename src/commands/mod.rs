// Register application subcommands.
// Each module corresponds to one `osgeo4w-installer` command-line action.

// Writes a starter config file.
pub mod generate;
// Runs the full download / install / patch pipeline.
pub mod install;
// Prints the resolved plan and command lines.
pub mod plan;
// Writes pycharm_env.bat.
pub mod pycharm_env;
pub mod version;
