//! Lockable resources.
//!
//! A resource joins the locking system by implementing [`Lockable`]: it
//! supplies its key and its own modification time. The lock itself is never
//! stored on the resource; the engine looks it up by key.

use crate::error::{EditLockError, Result};
use crate::fs::atomic_write;
use crate::store::ResourceKey;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Something that can be locked for editing.
pub trait Lockable {
    /// Identity used to look up the lock.
    fn resource_key(&self) -> ResourceKey;

    /// When the resource content was last saved. Maintained by the resource's
    /// own storage; the engine only reads it.
    fn modified_at(&self) -> DateTime<Utc>;

    /// Who saved the resource last, if known.
    fn modified_by(&self) -> Option<String> {
        None
    }
}

/// A plain resource description, for callers that track modification state
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub key: ResourceKey,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
}

impl Resource {
    pub fn new(key: ResourceKey, modified_at: DateTime<Utc>) -> Self {
        Self {
            key,
            modified_at,
            modified_by: None,
        }
    }

    pub fn with_modified_by(mut self, who: impl Into<String>) -> Self {
        self.modified_by = Some(who.into());
        self
    }
}

impl Lockable for Resource {
    fn resource_key(&self) -> ResourceKey {
        self.key.clone()
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    fn modified_by(&self) -> Option<String> {
        self.modified_by.clone()
    }
}

/// Resource type used for files inside a workspace.
pub const FILE_RESOURCE_TYPE: &str = "file";

/// A file inside a workspace root, keyed by its root-relative path.
///
/// `modified_at` is the file's mtime at the moment it was opened.
#[derive(Debug, Clone)]
pub struct FileResource {
    key: ResourceKey,
    path: PathBuf,
    modified_at: DateTime<Utc>,
}

impl FileResource {
    /// Open `path` (absolute, or relative to the current directory) as a
    /// resource of the workspace rooted at `root`.
    pub fn open(root: &Path, path: &Path) -> Result<Self> {
        let root = canonical_root(root)?;
        let path = path.canonicalize().map_err(|e| {
            EditLockError::UserError(format!("failed to resolve '{}': {}", path.display(), e))
        })?;

        if !path.is_file() {
            return Err(EditLockError::UserError(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }

        let key = relative_key(&root, &path)?;
        let modified_at = read_mtime(&path)?;

        Ok(Self {
            key,
            path,
            modified_at,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file content atomically and refresh `modified_at`.
    pub fn write(&mut self, content: &[u8]) -> Result<()> {
        atomic_write(&self.path, content)?;
        self.modified_at = read_mtime(&self.path)?;
        Ok(())
    }
}

impl Lockable for FileResource {
    fn resource_key(&self) -> ResourceKey {
        self.key.clone()
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

/// Key of the file at `path` in the workspace rooted at `root`.
///
/// Unlike [`FileResource::open`] the file need not exist, so locks on
/// deleted files can still be released.
pub fn file_key(root: &Path, path: &Path) -> Result<ResourceKey> {
    let root = canonical_root(root)?;
    let path = resolve_lexically(path)?;
    relative_key(&root, &path)
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize().map_err(|e| {
        EditLockError::UserError(format!(
            "failed to resolve workspace root '{}': {}",
            root.display(),
            e
        ))
    })
}

fn relative_key(root: &Path, path: &Path) -> Result<ResourceKey> {
    let relative = path.strip_prefix(root).map_err(|_| {
        EditLockError::UserError(format!(
            "'{}' is outside the workspace at '{}'",
            path.display(),
            root.display()
        ))
    })?;

    let id = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    if id.is_empty() {
        return Err(EditLockError::UserError(format!(
            "'{}' is the workspace root, not a file",
            path.display()
        )));
    }

    Ok(ResourceKey::new(FILE_RESOURCE_TYPE, id))
}

/// Absolute, `..`-free form of `path`, canonicalizing the longest prefix
/// that exists on disk.
fn resolve_lexically(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| {
                EditLockError::UserError(format!("failed to get current working directory: {}", e))
            })?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    let mut missing = Vec::new();
    let mut existing = normalized.as_path();
    loop {
        if let Ok(mut resolved) = existing.canonicalize() {
            for part in missing.iter().rev() {
                resolved.push(part);
            }
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    Ok(normalized)
}

fn read_mtime(path: &Path) -> Result<DateTime<Utc>> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| {
            EditLockError::StoreError(format!(
                "failed to read modification time of '{}': {}",
                path.display(),
                e
            ))
        })?;
    Ok(DateTime::<Utc>::from(modified))
}
