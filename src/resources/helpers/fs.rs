//! File-system resource helpers.
use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// This is a shared helper for resource `apply()` methods that need to
/// create parent directories before writing a file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
///
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    if path.exists() || path.symlink_metadata().is_ok() {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file or a whole directory tree at `path`.
///
/// Returns `true` when something was removed.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_path(path: &Path) -> Result<bool> {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => {
            std::fs::remove_dir_all(path)
                .with_context(|| format!("remove directory: {}", path.display()))?;
            Ok(true)
        }
        Ok(_) => {
            remove_existing(path)?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Delete `dir` with everything in it and create it again empty.
///
/// # Errors
///
/// Returns an error if the directory cannot be removed or created.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    remove_path(dir)?;
    std::fs::create_dir_all(dir).with_context(|| format!("create directory: {}", dir.display()))
}

/// Entries of `dir` whose file name is not in `keep`, in name order.
///
/// A missing `dir` is treated as empty.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn stale_entries(dir: &Path, keep: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("reading directory {}", dir.display())),
    };
    let mut stale = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        if !keep.contains(entry.file_name().to_string_lossy().as_ref()) {
            stale.push(entry.path());
        }
    }
    stale.sort();
    Ok(stale)
}

/// Remove every entry of `dir` whose file name is not in `keep`.
///
/// Returns the removed paths in name order.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or an entry cannot be
/// removed.
pub fn prune_dir(dir: &Path, keep: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let stale = stale_entries(dir, keep)?;
    for path in &stale {
        remove_path(path)?;
    }
    Ok(stale)
}

/// SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Sha256::digest(&bytes).to_vec())
}

/// Whether two files hold the same bytes.
///
/// Sizes are compared first so differing files are usually rejected without
/// hashing either one.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let len_a = std::fs::metadata(a)
        .with_context(|| format!("stat {}", a.display()))?
        .len();
    let len_b = std::fs::metadata(b)
        .with_context(|| format!("stat {}", b.display()))?
        .len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(file_digest(a)? == file_digest(b)?)
}
