// Building blocks of the install pipeline.

pub mod config_loading;
// Derived launcher generation.
pub mod launcher;
// geos_c.dll copy and gdal.py replace-with-backup.
pub mod patcher;
pub mod pipeline;
pub mod process_runner;
// pycharm_env.bat generator.
pub mod pycharm_env;
pub mod summary;
pub mod utilities;
