// Shared helpers used across the installer steps.

// Path expansion and default locations.
pub mod path_helpers;
// Comparison, atomic writes and no-clobber copies.
pub mod file_operations;
