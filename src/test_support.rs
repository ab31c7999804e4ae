use crate::config::Config;
use crate::context::STATE_DIR_NAME;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Temp directory with an initialized `.editlock/` and default config.
pub(crate) fn create_test_workspace() -> TempDir {
    create_workspace_with_config(&Config::default())
}

pub(crate) fn create_workspace_with_config(config: &Config) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let state_dir = temp_dir.path().join(STATE_DIR_NAME);

    std::fs::create_dir_all(state_dir.join("locks")).unwrap();
    std::fs::write(state_dir.join("config.yaml"), config.to_yaml().unwrap()).unwrap();

    temp_dir
}

/// Write `content` to `rel` under `root`, creating parent directories.
pub(crate) fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
