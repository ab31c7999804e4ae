//! Workspace resolution for editlock.
//!
//! A workspace is any directory containing a `.editlock/` state directory.
//! Commands locate it by walking up from the working directory, so they can
//! be invoked from anywhere inside the tree. Lock records, config and the
//! audit log all live under the state directory.

use crate::config::Config;
use crate::error::{EditLockError, Result};
use crate::store::FileLockStore;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the state directory at the workspace root.
pub const STATE_DIR_NAME: &str = ".editlock";

/// Resolved paths for an editlock workspace. All paths are absolute.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `.editlock/`. File resource ids are relative to it.
    pub root: PathBuf,

    /// `{root}/.editlock/`
    pub state_dir: PathBuf,

    /// `{root}/.editlock/locks/`, one JSON record per locked resource.
    pub locks_dir: PathBuf,
}

impl Workspace {
    /// Workspace rooted at `root`, whether or not it has been initialized.
    pub fn at<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = absolute(root.as_ref())?;
        let state_dir = root.join(STATE_DIR_NAME);
        let locks_dir = state_dir.join("locks");
        Ok(Self {
            root,
            state_dir,
            locks_dir,
        })
    }

    /// Resolve the workspace from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            EditLockError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Find the nearest ancestor of `start` (inclusive) holding `.editlock/`.
    pub fn resolve_from<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = absolute(start.as_ref())?;

        for dir in start.ancestors() {
            if dir.join(STATE_DIR_NAME).is_dir() {
                return Self::at(dir);
            }
        }

        Err(EditLockError::UserError(format!(
            "not inside an editlock workspace (no {} directory found above '{}').\n\n\
             Run `editlock init` to create one.",
            STATE_DIR_NAME,
            start.display()
        )))
    }

    pub fn exists(&self) -> bool {
        self.state_dir.is_dir()
    }

    /// Error with a hint to run `editlock init` if the state directory is missing.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.exists() {
            return Err(EditLockError::UserError(format!(
                "editlock workspace not initialized.\n\
                 Expected state directory at: {}\n\n\
                 Run `editlock init` to initialize it.",
                self.state_dir.display()
            )));
        }
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join("config.yaml")
    }

    pub fn events_file(&self) -> PathBuf {
        self.state_dir.join("events.ndjson")
    }

    /// Load `config.yaml`, falling back to defaults when it is absent.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }

    /// File-backed lock store rooted at `locks/`.
    pub fn lock_store(&self) -> FileLockStore {
        FileLockStore::new(&self.locks_dir)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| {
        EditLockError::UserError(format!("failed to get current working directory: {}", e))
    })?;
    Ok(cwd.join(path))
}

/// Resolve the workspace and make sure it is initialized.
///
/// Every command except `init` goes through this.
pub fn require_initialized_workspace() -> Result<Workspace> {
    let ws = Workspace::resolve()?;
    ws.ensure_initialized()?;
    Ok(ws)
}
