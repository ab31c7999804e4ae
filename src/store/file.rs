//! File-backed lock store.
//!
//! Layout: `{root}/{resource_type}/{encoded resource_id}.json`, one file per
//! key. The id is percent-encoded so any string maps to a single flat file
//! name; ids whose encoding would not fit in a file name are stored under the
//! SHA-256 of the id instead. The record itself carries the original id, so
//! listing never has to decode file names.

use super::record::validate_resource_type;
use super::{LockRecord, LockStore, ResourceKey};
use crate::error::{EditLockError, Result};
use crate::fs::atomic_write;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Longest encoded id used verbatim as a file stem. Leaves room for the
/// extension under the common 255-byte file name limit.
const MAX_ENCODED_ID_LEN: usize = 200;

/// Marks hashed file stems. `~` is always escaped by `encode_id`, so a hashed
/// name never collides with an encoded one.
const HASHED_ID_PREFIX: &str = "~sha256-";

/// Lock store keeping one JSON file per resource under a root directory.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    root: PathBuf,
}

impl FileLockStore {
    /// Use `root` as the locks directory. It is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &ResourceKey) -> Result<PathBuf> {
        key.validate()?;
        Ok(self
            .root
            .join(&key.resource_type)
            .join(format!("{}.json", file_stem(&key.resource_id))))
    }

    fn read_record(path: &Path) -> Result<Option<LockRecord>> {
        match fs::read_to_string(path) {
            Ok(content) => LockRecord::from_json(&content).map(Some).map_err(|e| {
                EditLockError::StoreError(format!("lock file '{}': {}", path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EditLockError::StoreError(format!(
                "failed to read lock file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn list_dir(&self, dir: &Path, out: &mut Vec<LockRecord>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(EditLockError::StoreError(format!(
                    "failed to read locks directory '{}': {}",
                    dir.display(),
                    e
                )));
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| {
                EditLockError::StoreError(format!("failed to read locks directory entry: {}", e))
            })?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match Self::read_record(&path) {
                Ok(Some(record)) => out.push(record),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable lock file"),
            }
        }

        Ok(())
    }
}

impl LockStore for FileLockStore {
    fn get(&self, key: &ResourceKey) -> Result<Option<LockRecord>> {
        Self::read_record(&self.record_path(key)?)
    }

    fn upsert(&self, record: &LockRecord) -> Result<()> {
        let path = self.record_path(&record.key)?;
        atomic_write(&path, record.to_json()?.as_bytes())
    }

    fn delete(&self, key: &ResourceKey) -> Result<bool> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(EditLockError::StoreError(format!(
                "failed to remove lock file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn list(&self, resource_type: Option<&str>) -> Result<Vec<LockRecord>> {
        let mut records = Vec::new();

        match resource_type {
            Some(t) => {
                validate_resource_type(t)?;
                self.list_dir(&self.root.join(t), &mut records)?
            }
            None => {
                let entries = match fs::read_dir(&self.root) {
                    Ok(entries) => entries,
                    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(records),
                    Err(e) => {
                        return Err(EditLockError::StoreError(format!(
                            "failed to read locks directory '{}': {}",
                            self.root.display(),
                            e
                        )));
                    }
                };
                for entry in entries.filter_map(|e| e.ok()) {
                    let path = entry.path();
                    if path.is_dir() {
                        self.list_dir(&path, &mut records)?;
                    }
                }
            }
        }

        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }
}

/// Encoded id, or its hash when the encoding is too long for a file name.
fn file_stem(id: &str) -> String {
    let encoded = encode_id(id);
    if encoded.len() <= MAX_ENCODED_ID_LEN {
        encoded
    } else {
        format!("{}{}", HASHED_ID_PREFIX, hex::encode(Sha256::digest(id.as_bytes())))
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_.-]`, plus a leading dot.
fn encode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for (i, byte) in id.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || byte == b'_'
            || byte == b'-'
            || (byte == b'.' && i > 0);
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_id_keeps_safe_characters() {
        assert_eq!(encode_id("draft-2024_v1.md"), "draft-2024_v1.md");
    }

    #[test]
    fn encode_id_escapes_separators() {
        assert_eq!(encode_id("docs/intro.md"), "docs%2Fintro.md");
        assert_eq!(encode_id("a b"), "a%20b");
        assert_eq!(encode_id("..secret"), "%2E.secret");
    }

    #[test]
    fn distinct_ids_map_to_distinct_files() {
        assert_ne!(encode_id("a/b"), encode_id("a%2Fb"));
    }

    #[test]
    fn short_ids_keep_their_encoding() {
        assert_eq!(file_stem("docs/intro.md"), "docs%2Fintro.md");
    }

    #[test]
    fn long_ids_are_hashed() {
        let deep = "section/".repeat(40) + "page.md";
        let stem = file_stem(&deep);

        assert!(stem.starts_with(HASHED_ID_PREFIX));
        assert_eq!(stem.len(), HASHED_ID_PREFIX.len() + 64);
        assert_ne!(stem, file_stem(&(deep.clone() + "x")));
        assert_eq!(stem, file_stem(&deep));
    }

    #[test]
    fn hashed_names_cannot_collide_with_encoded_ones() {
        assert!(encode_id("~sha256-00").starts_with("%7E"));
    }
}
