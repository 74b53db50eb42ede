// Steps that reach outside the process: the network and external installers.

/// Downloads the vendor installer unless it is cached.
pub(crate) mod fetcher;

/// Builds and runs the osgeo4w-setup command line.
pub(crate) mod setup_exe;

/// Installs Python packages with pip through a derived launcher.
pub(crate) mod pip;
