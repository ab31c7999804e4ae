//! Atomic file replacement.
//!
//! 1. Write the content to a fresh temporary file in the target's directory
//! 2. fsync the temporary file
//! 3. Rename it over the target
//!
//! Rename is atomic only when source and target share a filesystem, which is
//! why the temporary file lives next to the target. Every call gets its own
//! randomly named temporary file, so concurrent writers of the same target
//! (threads or processes) never share one.

use crate::error::{EditLockError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Prefix of in-flight temporary files. The leading dot keeps them out of
/// record listings.
const TEMP_PREFIX: &str = ".editlock-";
const TEMP_SUFFIX: &str = ".tmp";

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// Failures are reported as store errors: every caller is persisting either a
/// lock record or resource content on behalf of the lock engine.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| {
            EditLockError::StoreError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp = write_and_sync(parent, content)?;

    // Temporary files are created owner-only; a replaced file keeps its mode.
    if let Ok(meta) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| {
                EditLockError::StoreError(format!(
                    "failed to copy permissions of '{}': {}",
                    path.display(),
                    e
                ))
            })?;
    }

    // On failure the temporary file is removed when the error drops it.
    temp.persist(path).map_err(|e| {
        EditLockError::StoreError(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e.error
        ))
    })?;

    sync_parent_dir(parent);
    Ok(())
}

/// Persist the directory entry too; best effort.
#[cfg(unix)]
fn sync_parent_dir(parent: &Path) {
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_parent: &Path) {}

fn write_and_sync(dir: &Path, content: &[u8]) -> Result<NamedTempFile> {
    let mut temp = Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| {
            EditLockError::StoreError(format!(
                "failed to create temporary file in '{}': {}",
                dir.display(),
                e
            ))
        })?;

    temp.write_all(content)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| {
            EditLockError::StoreError(format!(
                "failed to write temporary file '{}': {}",
                temp.path().display(),
                e
            ))
        })?;

    Ok(temp)
}
