//! Implementation of `editlock release` and `editlock force-release`.

use super::Session;
use crate::cli::{ForceReleaseArgs, ReleaseArgs};
use crate::error::Result;
use crate::events::{Event, EventAction};
use crate::store::{LockStore, ResourceKey};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn cmd_release(args: ReleaseArgs) -> Result<()> {
    let session = Session::open()?;
    let holder = session.holder(&args.holder)?;

    let key = release(&session, &args.path, &holder)?;
    println!("Released lock on {}.", key);
    Ok(())
}

pub fn cmd_force_release(args: ForceReleaseArgs) -> Result<()> {
    let session = Session::open()?;

    let removed = force_release(&session, &args.paths)?;
    println!(
        "Removed {} of {} lock(s).",
        removed.len(),
        args.paths.len()
    );
    for key in &removed {
        println!("  {}", key);
    }
    Ok(())
}

/// Release `holder`'s own lock. Fails with `NotHolder` otherwise.
pub(crate) fn release(session: &Session, path: &Path, holder: &str) -> Result<ResourceKey> {
    let key = session.key(path)?;
    session.engine.release_for(&key, holder)?;

    session.record(
        Event::new(EventAction::Release)
            .with_actor(holder)
            .with_resource(&key),
    );

    Ok(key)
}

/// Remove the locks on `paths` whoever holds them. Returns the keys that had
/// a record.
pub(crate) fn force_release(session: &Session, paths: &[PathBuf]) -> Result<Vec<ResourceKey>> {
    let keys = paths
        .iter()
        .map(|p| session.key(p))
        .collect::<Result<Vec<_>>>()?;

    let mut removed = Vec::new();
    for key in &keys {
        let previous = session.engine.store().get(key)?.and_then(|r| r.locked_by);
        if session.engine.release_all(std::iter::once(key))? == 1 {
            session.record(
                Event::new(EventAction::ForceRelease)
                    .with_resource(key)
                    .with_details(json!({ "previous_holder": previous })),
            );
            removed.push(key.clone());
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests_support::{session_in, workspace_file};
    use crate::commands::acquire::acquire;
    use crate::error::EditLockError;
    use crate::events::read_events;
    use crate::test_support::create_test_workspace;

    #[test]
    fn test_release_by_holder() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        let file = workspace_file(temp_dir.path(), "a.md", "x");
        acquire(&session, &file, "alice", false).unwrap();

        let key = release(&session, &file, "alice").unwrap();

        assert!(!session.engine.is_locked(&key).unwrap());
        let last = read_events(&session.ws).unwrap().pop().unwrap();
        assert_eq!(last.action, EventAction::Release);
    }

    #[test]
    fn test_release_by_other_is_refused() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        let file = workspace_file(temp_dir.path(), "a.md", "x");
        acquire(&session, &file, "alice", false).unwrap();

        let err = release(&session, &file, "bob").unwrap_err();

        assert!(matches!(err, EditLockError::NotHolder { .. }));
        let key = session.key(&file).unwrap();
        assert_eq!(session.engine.locked_by(&key).unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_force_release_counts_existing_locks() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        let a = workspace_file(temp_dir.path(), "a.md", "x");
        let b = workspace_file(temp_dir.path(), "docs/b.md", "y");
        acquire(&session, &a, "alice", true).unwrap();

        let removed = force_release(&session, &[a.clone(), b]).unwrap();

        assert_eq!(removed, vec![ResourceKey::new("file", "a.md")]);
        assert!(!session.engine.is_locked(&removed[0]).unwrap());

        let last = read_events(&session.ws).unwrap().pop().unwrap();
        assert_eq!(last.action, EventAction::ForceRelease);
        assert_eq!(last.details["previous_holder"], "alice");
    }

    #[test]
    fn test_force_release_of_deleted_file() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        let a = workspace_file(temp_dir.path(), "a.md", "x");
        acquire(&session, &a, "alice", false).unwrap();
        std::fs::remove_file(&a).unwrap();

        let removed = force_release(&session, &[a]).unwrap();
        assert_eq!(removed.len(), 1);
    }
}
