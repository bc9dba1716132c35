//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write bytes to a file, creating parent directories if needed.
///
/// An existing file is truncated and replaced, never appended to.
pub fn write_bytes(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    write_bytes(path, contents.as_bytes())
}

/// Remove whatever is at `path` without following symlinks.
///
/// Real directories are removed recursively; files and symlinks are
/// unlinked. Returns `false` if nothing was there.
pub fn remove_entry(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to inspect: {}", path.display()))
        }
    };

    let result = if meta.file_type().is_dir() {
        fs::remove_dir_all(path)
    } else {
        remove_link_or_file(path)
    };
    result.with_context(|| format!("failed to remove: {}", path.display()))?;
    Ok(true)
}

#[cfg(unix)]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    // Directory symlinks on Windows must be removed as directories.
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Create a directory symlink (platform-aware).
#[cfg(unix)]
pub fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}
