// Small filesystem primitives used by the fetcher, the launcher extender and the patcher.

use crate::errors::{InstallerError, Result};
use crate::log_debug;
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Byte-for-byte comparison of two existing files.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = fs::metadata(a).map_err(InstallerError::io(a))?;
    let meta_b = fs::metadata(b).map_err(InstallerError::io(b))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    let bytes_a = fs::read(a).map_err(InstallerError::io(a))?;
    let bytes_b = fs::read(b).map_err(InstallerError::io(b))?;
    Ok(bytes_a == bytes_b)
}

/// Creates `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        log_debug!("[O4W::Fs] Creating directory {}", dir.display().to_string().cyan());
        fs::create_dir_all(dir).map_err(InstallerError::io(dir))?;
    }
    Ok(())
}

/// Temporary file in the same directory as `dest`, so that `persist` is a rename
/// on one filesystem.
pub fn temp_file_beside(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;
    NamedTempFile::new_in(dir).map_err(InstallerError::io(dir))
}

/// Replaces `dest` with `bytes` through a temporary file and a rename.
/// Readers see either the old content or the new one, never a partial file.
pub fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp = temp_file_beside(dest)?;
    temp.write_all(bytes).map_err(InstallerError::io(temp.path()))?;
    temp.as_file().sync_all().map_err(InstallerError::io(temp.path()))?;
    temp.persist(dest)
        .map_err(|e| InstallerError::io(dest)(e.error))?;
    Ok(())
}

/// Copies `src` to `dest` only if `dest` does not exist yet.
///
/// Returns `Ok(false)` without writing anything when `dest` is already there. The
/// existence check and the creation are one `create_new` open, so two racing copies
/// cannot both succeed.
pub fn copy_no_clobber(src: &Path, dest: &Path) -> Result<bool> {
    let mut reader = fs::File::open(src).map_err(InstallerError::io(src))?;
    let mut writer = match fs::OpenOptions::new().write(true).create_new(true).open(dest) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(InstallerError::io(dest)(e)),
    };
    io::copy(&mut reader, &mut writer).map_err(InstallerError::io(dest))?;
    writer.sync_all().map_err(InstallerError::io(dest))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn compares_content_not_names() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        fs::write(&a, b"same").unwrap();
        fs::write(&b, b"same").unwrap();
        fs::write(&c, b"diff").unwrap();
        assert!(files_equal(&a, &b).unwrap());
        assert!(!files_equal(&a, &c).unwrap());
        assert!(files_equal(&a, &dir.path().join("missing")).is_err());
    }

    #[test]
    fn atomic_write_creates_parents_and_replaces() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("nested").join("file.txt");
        write_atomically(&dest, b"one").unwrap();
        write_atomically(&dest, b"two").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"two");
        // only the destination is left behind
        assert_eq!(fs::read_dir(dest.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn no_clobber_copy_leaves_existing_file_alone() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();
        assert!(!copy_no_clobber(&src, &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"old");

        fs::remove_file(&dest).unwrap();
        assert!(copy_no_clobber(&src, &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }
}
