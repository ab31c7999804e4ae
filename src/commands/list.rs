//! Implementation of the `editlock list` command.
//!
//! Lists active locks, or every stored record with `--all`. Expired records
//! stay on disk until someone re-acquires or releases the resource, so
//! `--all` is how stale entries become visible.

use super::Session;
use crate::cli::ListArgs;
use crate::engine::LockStatus;
use crate::error::{EditLockError, Result};
use globset::{Glob, GlobMatcher};

pub fn cmd_list(args: ListArgs) -> Result<()> {
    let session = Session::open()?;
    let locks = list(&session, &args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&locks)
            .map_err(|e| EditLockError::UserError(format!("failed to serialize locks: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if locks.is_empty() {
        println!("No {}locks.", if args.all { "" } else { "active " });
        return Ok(());
    }

    println!("Locks ({}):", locks.len());
    println!();
    for lock in &locks {
        let holder = lock.locked_by.as_deref().unwrap_or("-");
        let remaining = match lock.seconds_remaining {
            Some(_) if lock.is_locked => format!("{} min left", lock.minutes_remaining()),
            Some(_) => "expired".to_string(),
            None => "no timestamp".to_string(),
        };
        let kind = lock.lock_type.map(|t| t.as_str()).unwrap_or("-");
        println!("  {:<40} {:<5} {:<24} {}", lock.resource, kind, holder, remaining);
    }

    Ok(())
}

pub(crate) fn list(session: &Session, args: &ListArgs) -> Result<Vec<LockStatus>> {
    let resource_type = args.resource_type.as_deref();
    let matcher = args.glob.as_deref().map(compile_glob).transpose()?;

    let mut locks = session.engine.list_locked(resource_type)?;
    if args.all {
        locks.extend(session.engine.list_unlocked(resource_type)?);
        locks.sort_by(|a, b| a.resource.cmp(&b.resource));
    }

    if let Some(matcher) = matcher {
        locks.retain(|l| matcher.is_match(&l.resource.resource_id));
    }

    Ok(locks)
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| EditLockError::UserError(format!("invalid glob pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::acquire::acquire;
    use crate::commands::tests_support::{session_in, workspace_file};
    use crate::store::{LockRecord, LockStore, ResourceKey};
    use crate::test_support::create_test_workspace;
    use chrono::{Duration, Utc};

    fn ids(locks: &[LockStatus]) -> Vec<String> {
        locks.iter().map(|l| l.resource.resource_id.clone()).collect()
    }

    #[test]
    fn test_list_active_and_all() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        let a = workspace_file(temp_dir.path(), "a.md", "x");
        acquire(&session, &a, "alice", false).unwrap();

        // A record from an hour ago is long expired.
        let stale = LockRecord::locked(
            ResourceKey::new("file", "old.md"),
            "bob",
            Utc::now() - Duration::hours(1),
            false,
        );
        session.engine.store().upsert(&stale).unwrap();

        let active = list(&session, &ListArgs::default()).unwrap();
        assert_eq!(ids(&active), vec!["a.md"]);

        let all = list(
            &session,
            &ListArgs {
                all: true,
                ..ListArgs::default()
            },
        )
        .unwrap();
        assert_eq!(ids(&all), vec!["a.md", "old.md"]);
        assert!(!all[1].is_locked);
    }

    #[test]
    fn test_list_glob_filter() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        for rel in ["docs/a.md", "docs/b.txt", "top.md"] {
            let f = workspace_file(temp_dir.path(), rel, "x");
            acquire(&session, &f, "alice", false).unwrap();
        }

        let args = ListArgs {
            glob: Some("docs/*.md".to_string()),
            ..ListArgs::default()
        };
        assert_eq!(ids(&list(&session, &args).unwrap()), vec!["docs/a.md"]);
    }

    #[test]
    fn test_list_type_filter() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        let f = workspace_file(temp_dir.path(), "a.md", "x");
        acquire(&session, &f, "alice", false).unwrap();

        let args = ListArgs {
            resource_type: Some("story".to_string()),
            ..ListArgs::default()
        };
        assert!(list(&session, &args).unwrap().is_empty());
    }

    #[test]
    fn test_list_invalid_glob() {
        let temp_dir = create_test_workspace();
        let session = session_in(temp_dir.path());
        let args = ListArgs {
            glob: Some("[".to_string()),
            ..ListArgs::default()
        };
        assert!(matches!(
            list(&session, &args).unwrap_err(),
            EditLockError::UserError(_)
        ));
    }
}
