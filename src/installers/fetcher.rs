// Fetcher: makes sure the vendor installer executable is on disk.
//
// Cache-first: an existing file is trusted as-is and nothing touches the network.
// Downloads stream into a temporary file next to the destination and are renamed
// into place only once complete, so an interrupted download never looks cached.

use crate::errors::{InstallerError, Result};
use crate::libs::utilities::file_operations::{ensure_dir, temp_file_beside};
use crate::{log_debug, log_info};
use colored::Colorize;
use std::io;
use std::path::Path;

/// Fetches `url` into `dest`.
pub trait Downloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP(S) downloads through `ureq`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        log_debug!("[O4W::Fetcher] Starting download from URL: {}", url.blue());

        let download_error = |reason: String| InstallerError::Download {
            url: url.to_string(),
            reason,
        };

        // Non-2xx statuses come back as `ureq::Error::Status`.
        let response = ureq::get(url)
            .call()
            .map_err(|e| download_error(e.to_string()))?;

        let mut temp = temp_file_beside(dest)?;
        let mut reader = response.into_reader();
        let bytes = io::copy(&mut reader, &mut temp).map_err(|e| download_error(e.to_string()))?;
        temp.persist(dest)
            .map_err(|e| InstallerError::io(dest)(e.error))?;

        log_debug!(
            "[O4W::Fetcher] {} bytes written to {}",
            bytes,
            dest.display().to_string().green()
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was already present; no network access happened.
    Cached,
    Downloaded,
}

/// Makes sure the file at `dest` exists, downloading it from `url` if needed.
///
/// An existing file is trusted as-is; there is no size or checksum check, so a
/// re-run never downloads again. A new download lands in a temporary file beside
/// `dest` and is renamed into place only when complete.
///
/// # Arguments
/// * `url`: Full URL of the file.
/// * `dest`: Target path. Parent directories are created on demand.
/// * `downloader`: Performs the transfer.
///
/// # Returns
/// * `Ok(FetchOutcome::Cached)` if `dest` was already there.
/// * `Ok(FetchOutcome::Downloaded)` after a successful download.
/// * `Err(InstallerError::Download)` or `Err(InstallerError::Io)` otherwise. Errors are
///   not retried and no partial file is left at `dest`.
pub fn ensure_file(url: &str, dest: &Path, downloader: &dyn Downloader) -> Result<FetchOutcome> {
    if dest.is_file() {
        log_info!(
            "[O4W::Fetcher] Using cached installer {}",
            dest.display().to_string().cyan()
        );
        return Ok(FetchOutcome::Cached);
    }

    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    log_info!("[O4W::Fetcher] Downloading {}...", url.blue());
    downloader.download(url, dest)?;
    Ok(FetchOutcome::Downloaded)
}


#[cfg(test)]
mod tests {
    use super::fake::{StaticDownloader, UnreachableDownloader};
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn downloads_into_new_directories() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("OSGeo4W-Setup").join("osgeo4w-setup-x86_64.exe");
        let downloader = StaticDownloader::new(b"MZ");

        let outcome = ensure_file("http://example/osgeo4w-setup-x86_64.exe", &dest, &downloader).unwrap();

        assert_eq!(outcome, FetchOutcome::Downloaded);
        assert_eq!(fs::read(&dest).unwrap(), b"MZ");
        assert_eq!(downloader.calls.get(), 1);
    }

    #[test]
    fn cached_file_skips_the_network() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("osgeo4w-setup-x86.exe");
        fs::write(&dest, b"old").unwrap();
        let downloader = StaticDownloader::new(b"new");

        let outcome = ensure_file("http://example/x", &dest, &downloader).unwrap();

        assert_eq!(outcome, FetchOutcome::Cached);
        assert_eq!(downloader.calls.get(), 0);
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn download_failures_propagate() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("setup.exe");
        let err = ensure_file("http://unreachable/setup.exe", &dest, &UnreachableDownloader).unwrap_err();
        assert!(matches!(err, InstallerError::Download { .. }));
        assert!(!dest.exists());
    }
}
